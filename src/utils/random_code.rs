use rand::Rng;

// 去掉易混淆的 0/O、1/I
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";

fn random_string(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// 报名参考码 REF-XXXXXXXX
pub fn generate_reference_code() -> String {
    format!("REF-{}", random_string(REFERENCE_CHARSET, 8))
}

/// 初始管理员密码
pub fn generate_random_password(length: usize) -> String {
    random_string(PASSWORD_CHARSET, length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_code_shape() {
        let code = generate_reference_code();
        assert_eq!(code.len(), 12);
        assert!(code.starts_with("REF-"));
        assert!(code[4..].bytes().all(|b| REFERENCE_CHARSET.contains(&b)));
    }

    #[test]
    fn test_random_password_length() {
        assert_eq!(generate_random_password(16).chars().count(), 16);
    }
}
