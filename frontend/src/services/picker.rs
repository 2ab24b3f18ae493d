//! File picking from an `<input type="file">`.

use js_sys::Uint8Array;
use plymeasure::{validate_file_name, ClientError, ClientResult, FilePicker, SelectedFile};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

/// Picker over the file the user chose in the browser dialog.
pub struct BrowserPicker {
    file: Option<File>,
}

impl BrowserPicker {
    /// First file of the input, `None` when the dialog was cancelled.
    pub fn from_input(input: &HtmlInputElement) -> Self {
        Self {
            file: input.files().and_then(|files| files.get(0)),
        }
    }
}

impl FilePicker for BrowserPicker {
    async fn pick(&self) -> ClientResult<Option<SelectedFile>> {
        let Some(file) = &self.file else {
            return Ok(None);
        };

        // Reject before reading the content.
        let name = file.name();
        validate_file_name(&name)?;

        let buffer = JsFuture::from(file.array_buffer())
            .await
            .map_err(|e| ClientError::Io(format!("{:?}", e)))?;
        let content = Uint8Array::new(&buffer).to_vec();

        let picked = SelectedFile::new(name, content);
        let mime_type = file.type_();
        Ok(Some(if mime_type.is_empty() {
            picked
        } else {
            picked.with_mime_type(mime_type)
        }))
    }
}
