use staymate_types::{
    GOVERNMENT_ID, PhoneCodeRequest, PhoneCodeSent, PhoneVerifyRequest, VerificationRequest,
    VerificationStatus,
};

use crate::{ApiClient, ApiRequest, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct VerificationApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VerificationApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> Result<VerificationStatus, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/verification/status"))
            .await
    }

    /// Ask the backend to text a one-time code to `phone_number`.
    pub async fn send_phone_code(&self, phone_number: &str) -> Result<PhoneCodeSent, ClientError> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(ClientError::InvalidRequest("phone number is required".into()));
        }
        let req = ApiRequest::post("/api/verification/phone").json(&PhoneCodeRequest {
            phone_number: phone_number.to_string(),
        })?;
        self.client.send_json(req).await
    }

    pub async fn verify_phone(&self, phone: &str, otp: &str) -> Result<(), ClientError> {
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ClientError::InvalidRequest("verification code is required".into()));
        }
        let req = ApiRequest::post("/api/verification/phone/verify").json(&PhoneVerifyRequest {
            otp: otp.to_string(),
            phone: phone.trim().to_string(),
        })?;
        self.client.send_empty(req).await
    }

    /// Upload an identity document for review. `document_type` defaults to
    /// [`GOVERNMENT_ID`].
    pub async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        document_type: Option<&str>,
    ) -> Result<VerificationRequest, ClientError> {
        if bytes.is_empty() {
            return Err(ClientError::InvalidRequest("document is empty".into()));
        }
        let document_type = document_type.unwrap_or(GOVERNMENT_ID);
        let req = ApiRequest::post("/api/verification/upload").file_part(
            "file",
            file_name,
            bytes,
            [("documentType".to_string(), document_type.to_string())],
        );
        self.client.send_json(req).await
    }
}
