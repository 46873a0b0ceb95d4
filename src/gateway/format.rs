//! 网关 URL 构建工具

/// 修复 base_url
///
/// - 移除末尾斜杠
/// - 修复双斜杠（保留协议部分）
pub fn fix_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().trim_end_matches('/').to_string();

    // 修复双斜杠（跳过协议部分）
    if let Some(pos) = url.find("://") {
        let (protocol, rest) = url.split_at(pos + 3);
        let mut fixed_rest = rest.to_string();
        while fixed_rest.contains("//") {
            fixed_rest = fixed_rest.replace("//", "/");
        }
        url = format!("{}{}", protocol, fixed_rest);
    }

    url
}

/// 构建端点 URL
///
/// 路径段逐个编码，代码库 ID 中的 `/`、`?` 等字符不会改变路由。
pub fn build_endpoint(base_url: &str, segments: &[&str]) -> String {
    let mut url = fix_base_url(base_url);
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_base_url() {
        assert_eq!(fix_base_url("http://localhost:5000/api/"), "http://localhost:5000/api");
        assert_eq!(fix_base_url("https://qa.example.com//api"), "https://qa.example.com/api");
        assert_eq!(fix_base_url("https://qa.example.com///api//"), "https://qa.example.com/api");
    }

    #[test]
    fn test_build_endpoint() {
        assert_eq!(
            build_endpoint("http://localhost:5000/api/", &["question", "ask"]),
            "http://localhost:5000/api/question/ask"
        );
        assert_eq!(
            build_endpoint("http://localhost:5000/api", &["history", "65f0c1d2e4"]),
            "http://localhost:5000/api/history/65f0c1d2e4"
        );
        assert_eq!(
            build_endpoint("http://localhost:5000/api", &["history"]),
            "http://localhost:5000/api/history"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        assert_eq!(
            build_endpoint("http://h/api", &["history", "a/b c?"]),
            "http://h/api/history/a%2Fb%20c%3F"
        );
        assert_eq!(
            build_endpoint("http://h/api", &["history", "代码库"]),
            "http://h/api/history/%E4%BB%A3%E7%A0%81%E5%BA%93"
        );
    }
}
