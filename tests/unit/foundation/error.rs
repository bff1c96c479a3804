use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DpError::invalid_argument("x")
            .to_string()
            .contains("invalid argument:")
    );
    assert!(
        DpError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DpError::invalid_file_type("x")
            .to_string()
            .contains("invalid file type:")
    );
    assert!(
        DpError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        DpError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        DpError::MissingRequiredField("photo")
            .to_string()
            .contains("missing required field: photo")
    );
}

#[test]
fn file_too_large_reports_size_and_limit() {
    let err = DpError::FileTooLarge {
        size: 6_291_456,
        limit: 5_242_880,
    };
    let msg = err.to_string();
    assert!(msg.contains("6291456"));
    assert!(msg.contains("5242880"));
}

#[test]
fn user_facing_classification() {
    assert!(DpError::invalid_file_type("text/plain").is_user_facing());
    assert!(DpError::MissingRequiredField("name").is_user_facing());
    assert!(!DpError::evaluation("boom").is_user_facing());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
