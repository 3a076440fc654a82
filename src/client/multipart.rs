//! Multipart form builders

use crate::error::{ApiError, ErrorKind, Result};
use crate::types::{Attachment, CollegeMediaUpdate, GalleryUpload};
use reqwest::multipart::{Form, Part};

fn file_part(attachment: &Attachment) -> Result<Part> {
    Part::bytes(attachment.bytes.clone())
        .file_name(attachment.file_name.clone())
        .mime_str(&attachment.mime_type)
        .map_err(|_| {
            ApiError::new(
                ErrorKind::Validation,
                format!("Unsupported attachment type: {}", attachment.mime_type),
            )
        })
}

/// Single file under the `image` field
pub(crate) fn image_form(attachment: &Attachment) -> Result<Form> {
    Ok(Form::new().part("image", file_part(attachment)?))
}

pub(crate) fn gallery_form(upload: &GalleryUpload) -> Result<Form> {
    let mut form = Form::new();
    if let Some(image) = &upload.image {
        form = form.part("image", file_part(image)?);
    }
    for (name, value) in upload.text_fields() {
        form = form.text(name, value);
    }
    Ok(form)
}

pub(crate) fn college_media_form(update: &CollegeMediaUpdate) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in update.text_fields()? {
        form = form.text(name, value);
    }
    if let Some(logo) = &update.logo {
        form = form.part("logo", file_part(logo)?);
    }
    if let Some(banner) = &update.banner {
        form = form.part("banner", file_part(banner)?);
    }
    for image in &update.faculty_images {
        form = form.part("facultyImages", file_part(image)?);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_mime() {
        let attachment = Attachment::new("x.bin", "not a mime type", vec![1]);
        let err = image_form(&attachment).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_gallery_form_without_image() {
        let upload = GalleryUpload {
            title: "Gate".into(),
            ..Default::default()
        };
        assert!(gallery_form(&upload).is_ok());
    }
}
