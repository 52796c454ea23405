/// The signed-in identity: the bearer token plus the profile the server
/// returned at signin. Passed explicitly to every API call, never held
/// in globals.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub token: String,
    pub email: String,
    pub full_name: String,
}
