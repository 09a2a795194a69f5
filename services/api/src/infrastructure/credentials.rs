/// パスワードのハッシュ化と検証
///
/// パスワードは平文では保存せず、argon2id（PHC文字列形式）で
/// ソルト付きハッシュ化して保存する。検証はハッシュに埋め込まれた
/// パラメータを使用する。
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// 資格情報処理のエラー型
#[derive(Debug, Error)]
pub enum CredentialError {
    /// ハッシュ生成に失敗
    #[error("Password hashing error: {0}")]
    HashError(String),
}

/// パスワードをargon2idでハッシュ化する
///
/// ソルトは呼び出しごとにランダム生成されるため、同じパスワードでも
/// 異なるハッシュ文字列になる。
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// パスワードを保存済みハッシュと照合する
///
/// ハッシュが不正な形式の場合も単に不一致として扱う。
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ハッシュ化したパスワードが検証できる
    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    /// 同じパスワードでもソルトにより異なるハッシュになる
    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
    }

    /// 不正な形式のハッシュは不一致扱い
    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("secret123", "not-a-phc-string"));
        assert!(!verify_password("secret123", ""));
    }
}
