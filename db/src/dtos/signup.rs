use uuid::Uuid;

pub struct SignupCreateRequest {
    pub email: String,
    pub link_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}
