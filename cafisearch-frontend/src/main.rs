use cafisearch_frontend::app::App;
use cafisearch_frontend::client::ApiClient;
use cafisearch_frontend::config::FrontendConfig;
use cafisearch_frontend::debounce::debounce;
use cafisearch_frontend::logging;
use cafisearch_frontend::search_box::Key;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Type to search. Commands: :up :down :enter :esc :quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FrontendConfig::load("frontend.toml")?;
    let _logging_guard = logging::init_logging("logs", "cafisearch-frontend", &config.log_level)?;

    tracing::info!("Cafisearch frontend started, API at {}", config.api_url);

    let client = ApiClient::new(config.api_url.clone())?;
    let mut app = App::new(client, config.reduced_motion);
    app.load_initial().await;

    println!("{}", HELP);
    render(&app);

    let (tx, mut debounced) = debounce::<String>(config.debounce());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":q" | ":quit" => break,
                    ":up" => { app.key(Key::Up); }
                    ":down" => { app.key(Key::Down); }
                    ":enter" => { app.key(Key::Enter); }
                    ":esc" => { app.key(Key::Escape); }
                    _ => {
                        app.input(&line);
                        if tx.send(line).is_err() {
                            break;
                        }
                        continue;
                    }
                }
                render(&app);
            }
            Some(query) = debounced.next() => {
                app.settle(&query).await;
                render(&app);
            }
        }
    }

    tracing::info!("Frontend exiting");
    Ok(())
}

fn render(app: &App) {
    let search_box = &app.search_box;
    println!("query: {}", search_box.query());
    for (i, place) in search_box.visible_results().iter().enumerate() {
        let marker = if search_box.selected() == Some(i) { '>' } else { ' ' };
        println!("{} {} | {} ({:.1})", marker, place.name, place.address, place.rating);
    }

    let camera = app.map.camera();
    match (app.map.selected(), app.map.fit_bounds()) {
        (Some(place), _) => println!(
            "map: {} markers, focused on {} at ({:.4}, {:.4}) zoom {}",
            app.map.markers().len(),
            place.name,
            camera.lat,
            camera.lng,
            camera.zoom
        ),
        (None, Some(fit)) => println!(
            "map: {} markers, bounds [{:.4}, {:.4}] - [{:.4}, {:.4}]",
            app.map.markers().len(),
            fit.bounds.south,
            fit.bounds.west,
            fit.bounds.north,
            fit.bounds.east
        ),
        (None, None) => println!(
            "map: centred at ({:.4}, {:.4}) zoom {}",
            camera.lat, camera.lng, camera.zoom
        ),
    }
}
