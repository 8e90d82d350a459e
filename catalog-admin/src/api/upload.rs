//! Multipart form reading and image validation

use std::collections::HashMap;

use axum::extract::Multipart;
use image::ImageFormat;
use rust_decimal::Decimal;
use shared::{AppError, AppResult, ErrorCode};

use crate::backend::ImageUpload;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Maximum multipart request size
pub const MAX_REQUEST_SIZE: usize = 64 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Validate an image file and return its content type
///
/// The format is sniffed from the bytes; the file extension, when it names
/// a known type, must be an image type too.
pub fn validate_image(data: &[u8], file_name: &str) -> AppResult<&'static str> {
    if data.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::EmptyFile,
            format!("Empty file provided: {file_name}"),
        ));
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large. Maximum size is {} bytes ({}MB)",
                MAX_FILE_SIZE,
                MAX_FILE_SIZE / 1024 / 1024
            ),
        )
        .with_detail("file", file_name));
    }

    if let Some(guessed) = mime_guess::from_path(file_name).first()
        && guessed.type_() != mime_guess::mime::IMAGE
    {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported file type '{guessed}' for {file_name}"),
        ));
    }

    match image::guess_format(data) {
        Ok(format) if SUPPORTED_FORMATS.contains(&format) => Ok(format.to_mime_type()),
        _ => Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("{file_name} is not a PNG, JPEG, WebP or GIF image"),
        )),
    }
}

/// A fully read multipart form: text fields plus image files by part name
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<ImageUpload>>,
}

impl MultipartForm {
    /// Read every part; parts with a file name are validated as images
    ///
    /// Empty file parts without a file name (an untouched file input) are
    /// ignored.
    pub async fn read(multipart: &mut Multipart) -> AppResult<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::invalid_request(format!("Invalid multipart request: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;

            match file_name {
                Some(file_name) => {
                    if data.is_empty() && file_name.is_empty() {
                        continue;
                    }
                    let content_type = validate_image(&data, &file_name)?;
                    form.files.entry(name).or_default().push(ImageUpload::new(
                        file_name,
                        content_type,
                        data.to_vec(),
                    ));
                }
                None => {
                    let text = String::from_utf8(data.to_vec()).map_err(|_| {
                        AppError::with_message(
                            ErrorCode::InvalidFormat,
                            format!("Field '{name}' is not valid UTF-8"),
                        )
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Non-blank text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Non-blank text field parsed as a price
    pub fn decimal(&self, name: &str) -> AppResult<Option<Decimal>> {
        self.text(name)
            .map(|raw| {
                raw.parse::<Decimal>().map_err(|_| {
                    AppError::with_message(ErrorCode::InvalidFormat, format!("{name} must be a number"))
                        .with_detail("field", name)
                })
            })
            .transpose()
    }

    /// Take the first file of a part
    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        let files = self.files.get_mut(name)?;
        if files.is_empty() {
            None
        } else {
            Some(files.remove(0))
        }
    }

    /// Copy of the first file of a part; the form keeps it for later references
    pub fn file(&self, name: &str) -> Option<ImageUpload> {
        self.files.get(name).and_then(|files| files.first()).cloned()
    }

    /// Take every file of a part
    pub fn take_files(&mut self, name: &str) -> Vec<ImageUpload> {
        self.files.remove(name).unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        fields: impl IntoIterator<Item = (&'static str, &'static str)>,
        files: impl IntoIterator<Item = (&'static str, ImageUpload)>,
    ) -> Self {
        let mut form = MultipartForm::default();
        for (k, v) in fields {
            form.fields.insert(k.to_string(), v.to_string());
        }
        for (k, f) in files {
            form.files.entry(k.to_string()).or_default().push(f);
        }
        form
    }
}
