use mvr_screen_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("mvr screening error: {err}");
        std::process::exit(1);
    }
}
