//! 上传文件的魔术字节校验
//!
//! 扩展名由客户端给出，不可信；这里核对文件头与扩展名是否一致。

const OLE_COMPOUND: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_LOCAL_HEADER: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_ARCHIVE: &[u8] = &[0x50, 0x4B, 0x05, 0x06];

/// 扩展名 -> 可接受的文件头，多个签名任一匹配即可
fn signatures(extension: &str) -> Option<&'static [&'static [u8]]> {
    let sigs: &'static [&'static [u8]] = match extension {
        ".pdf" => &[b"%PDF-"],
        ".png" => &[&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]],
        ".jpg" | ".jpeg" => &[&[0xFF, 0xD8, 0xFF]],
        ".gif" => &[b"GIF87a", b"GIF89a"],
        // 旧版 Office 为 OLE 复合文档
        ".doc" | ".xls" | ".ppt" => &[OLE_COMPOUND],
        // OOXML 与 zip 同为 zip 容器
        ".docx" | ".xlsx" | ".pptx" | ".zip" => &[ZIP_LOCAL_HEADER, ZIP_EMPTY_ARCHIVE],
        _ => return None,
    };
    Some(sigs)
}

/// 纯文本：不允许 NUL 字节
fn looks_like_text(data: &[u8]) -> bool {
    !data.contains(&0)
}

/// `extension` 含点号，大小写不敏感；未知扩展名一律拒绝
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    let extension = extension.to_ascii_lowercase();
    match extension.as_str() {
        ".txt" | ".csv" | ".md" => looks_like_text(data),
        other => match signatures(other) {
            Some(sigs) => sigs.iter().any(|sig| data.starts_with(sig)),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_and_images() {
        assert!(validate_magic_bytes(b"%PDF-1.7\n...", ".pdf"));
        assert!(validate_magic_bytes(b"%PDF-1.7\n...", ".PDF"));
        assert!(!validate_magic_bytes(b"%PDF-1.7\n...", ".png"));
        assert!(validate_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE1], ".jpeg"));
        assert!(validate_magic_bytes(b"GIF89a....", ".gif"));
    }

    #[test]
    fn test_office_documents() {
        assert!(validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14], ".docx"));
        assert!(validate_magic_bytes(OLE_COMPOUND, ".xls"));
        assert!(!validate_magic_bytes(OLE_COMPOUND, ".pptx"));
    }

    #[test]
    fn test_text_rejects_binary() {
        assert!(validate_magic_bytes("Dear teacher, ...".as_bytes(), ".txt"));
        assert!(!validate_magic_bytes(&[0x4D, 0x5A, 0x00, 0x90], ".txt"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".pdf"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
    }
}
