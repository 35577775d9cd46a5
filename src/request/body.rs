use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::errors::Error;

/// Request payload. Kept replayable: a form is rebuilt for every attempt.
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Pre-serialized JSON text.
    Text(String),
    /// Multipart form; the transport sets the content type and boundary.
    Form(Vec<FormPart>),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }

    pub fn is_form(&self) -> bool {
        matches!(self, RequestBody::Form(_))
    }
}

#[derive(Clone, Debug)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Clone, Debug)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime: None,
                bytes,
            },
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        if let FormValue::File { mime: slot, .. } = &mut self.value {
            *slot = Some(mime.into());
        }
        self
    }
}

pub(crate) fn build_form(parts: &[FormPart]) -> Result<Form, Error> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(value) => form.text(part.name.clone(), value.clone()),
            FormValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}
