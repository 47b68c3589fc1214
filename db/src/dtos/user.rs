pub struct UserSignInRequest {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}
