#[actix_web::main]
async fn main() -> std::io::Result<()> {
    org_directory_server::run().await
}
