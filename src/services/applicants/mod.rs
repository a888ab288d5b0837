pub mod list;
pub mod review;
pub mod signup;
pub mod status;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::applicants::requests::{
    ApplicantListParams, ApproveApplicantRequest, RejectApplicantRequest, SignupRequest,
    UpdateApplicantStatusRequest,
};

super::define_service! {
    /// 招生：报名、进度查询、审核、录取、拒绝
    ApplicantService
}

impl ApplicantService {
    pub async fn signup(
        &self,
        signup_request: SignupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        signup::handle_signup(self, signup_request, request).await
    }

    pub async fn get_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        status::get_status(self, request).await
    }

    pub async fn list_applicants(
        &self,
        query: ApplicantListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_applicants(self, query, request).await
    }

    pub async fn get_applicant(
        &self,
        applicant_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::get_applicant(self, applicant_id, request).await
    }

    pub async fn update_status(
        &self,
        applicant_id: i64,
        body: UpdateApplicantStatusRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::update_status(self, applicant_id, body, request).await
    }

    pub async fn approve(
        &self,
        applicant_id: i64,
        body: ApproveApplicantRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::approve(self, applicant_id, body, request).await
    }

    pub async fn reject(
        &self,
        applicant_id: i64,
        body: RejectApplicantRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::reject(self, applicant_id, body, request).await
    }
}
