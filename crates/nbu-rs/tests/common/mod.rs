use nbu_rs::NbuClient;


/// Live client; honours `NBU_BASE_URL` so the suite can point at a mirror.
pub fn setup_client() -> NbuClient {
    NbuClient::new_with_config(std::env::var("NBU_BASE_URL").ok())
}
