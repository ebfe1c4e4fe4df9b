use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use rulate_fetch::{CrawlerConfig, RulateCrawler, get_user_input, output_path};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "rulate-fetch.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = if Path::new(CONFIG_FILE).exists() {
        CrawlerConfig::from_json_file(CONFIG_FILE)?
    } else {
        CrawlerConfig::default()
    };
    let crawler = RulateCrawler::new(config)?;

    loop {
        println!("\n=== rulate-fetch ===");
        match get_user_input() {
            Ok(book_id) => {
                let path = output_path(book_id, crawler.config().output_extension());
                println!("\nСкачиваю книгу {}...", crawler.book_url(book_id));
                match crawler.save_fb2(book_id, &path).await {
                    Ok(path) => println!("Готово: {}", path.display()),
                    Err(e) => println!("Не удалось скачать книгу {}: {}", book_id, e),
                }
            }
            Err(e) => {
                println!("Ошибка ввода: {:#}", e);
            }
        }

        print!("\nСкачать ещё одну книгу? (y/n): ");
        io::stdout().flush()?;
        let mut continue_choice = String::new();
        io::stdin().read_line(&mut continue_choice)?;
        if continue_choice.trim().to_lowercase() != "y" {
            break;
        }
    }

    println!("Завершено.");
    Ok(())
}
