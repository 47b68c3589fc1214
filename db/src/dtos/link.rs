use uuid::Uuid;

pub struct LinkCreateRequest {
    pub short_code: String,
    pub original_url: String,
    pub user_id: Option<Uuid>,
}
