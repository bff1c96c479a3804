use super::*;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[test]
fn public_policy_rejects_six_megabytes() {
    let upload = Upload::new("big.jpg", Some("image/jpeg"), vec![0; 6 * 1024 * 1024]);
    let err = validate_image_upload(&upload, &UploadPolicy::public()).unwrap_err();
    assert!(matches!(
        err,
        DpError::FileTooLarge {
            size: 6_291_456,
            limit: 5_242_880
        }
    ));
}

#[test]
fn admin_policy_has_no_cap() {
    let upload = Upload::new("big.jpg", Some("image/jpeg"), vec![0; 6 * 1024 * 1024]);
    validate_image_upload(&upload, &UploadPolicy::admin()).unwrap();
}

#[test]
fn exactly_five_megabytes_is_allowed() {
    let upload = Upload::new("edge.png", Some("image/png"), vec![0; 5 * 1024 * 1024]);
    validate_image_upload(&upload, &UploadPolicy::public()).unwrap();
}

#[test]
fn non_image_mime_is_rejected() {
    let upload = Upload::new("notes.pdf", Some("application/pdf"), vec![1, 2, 3]);
    assert!(matches!(
        validate_image_upload(&upload, &UploadPolicy::admin()),
        Err(DpError::InvalidFileType(_))
    ));
}

#[test]
fn undeclared_type_is_sniffed() {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(&[0; 16]);
    let upload = Upload::new("blob", None, bytes);
    assert_eq!(upload.mime_type().as_deref(), Some("image/png"));
    validate_image_upload(&upload, &UploadPolicy::public()).unwrap();

    let unknown = Upload::new("blob", None, b"plain text".to_vec());
    assert!(matches!(
        validate_image_upload(&unknown, &UploadPolicy::public()),
        Err(DpError::InvalidFileType(_))
    ));
}
