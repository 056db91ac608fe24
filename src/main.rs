use orderdesk::app::App;
use orderdesk::config::AppConfig;
use orderdesk::error::ErrorCode;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load().await.expect("config load failed");
    let app = App::bootstrap(&config).expect("app bootstrap failed");

    let mut denials = app.denials.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = denials.recv().await {
            tracing::info!(attempted = %event.attempted, message = %event.message, "denied");
        }
    });

    let targets: Vec<String> = std::env::args().skip(1).collect();
    let targets = if targets.is_empty() { vec!["/".to_owned()] } else { targets };

    for target in targets {
        match app.navigator.navigate(&target).await {
            Ok(location) => tracing::info!(
                %target,
                path = %location.full_path,
                view = location.view.as_ref().map(|v| v.name.as_str()),
                not_found = location.not_found,
                "arrived"
            ),
            Err(err) => tracing::error!(%target, code = err.error_code(), error = %err, "navigation failed"),
        }
    }
}
