use dotenvy::dotenv;
use fintech_sdk::google::{GoogleModel, GoogleModelOptions};
use fintech_terminal::{
    instruction::STARTER_PROMPTS, interpret, read_attachments, Block, ChartKind, ChartSpec,
    FlagStore, Reply, SessionContext, Terminal, DEFAULT_MODEL_ID,
};
use std::{env, error::Error, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: f64 = 30.0;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = env::var("GOOGLE_API_KEY")
        .or_else(|_| env::var("API_KEY"))
        .map_err(|_| "GOOGLE_API_KEY must be set")?;
    let model_id = env::var("FINTECH_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
    let store = FlagStore::new(env::var("FINTECH_STATE_DIR").unwrap_or_else(|_| ".fintech".into()));

    let model = Arc::new(GoogleModel::new(
        model_id,
        GoogleModelOptions {
            api_key,
            ..Default::default()
        },
    ));
    let terminal = Terminal::builder(model).build();
    let session = terminal.create_session();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut context = SessionContext::restore(&store).await?;

    if !context.authenticated {
        println!("FinTech Alpha Terminal | secure login");
        prompt_line(&mut input, "email: ").await?;
        prompt_line(&mut input, "password: ").await?;
        context.login(&store).await?;
    }

    println!("Connected to {}. Try one of:", terminal.model_id());
    for starter in STARTER_PROMPTS {
        println!("  * {starter}");
    }
    println!("Commands: /attach <path>.., /clear, /yes, /no, /key, /logout, /quit");

    loop {
        if context.needs_key() {
            println!("[!] API key rejected. Use /key after configuring a valid key.");
        }
        let Some(line) = prompt_line(&mut input, "> ").await? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/logout", _) => {
                context.logout(&store).await?;
                println!("Session terminated.");
                break;
            }
            ("/key", _) => context.configure_key(),
            ("/clear", _) => session.clear_staged().await,
            ("/attach", paths) => {
                let paths: Vec<&str> = paths.split_whitespace().collect();
                match read_attachments(&paths).await {
                    Ok(files) => {
                        for file in files {
                            println!("staged {} ({})", file.name, file.mime_type);
                            session.stage_file(file).await;
                        }
                    }
                    Err(error) => println!("{error}"),
                }
            }
            ("/yes", _) => {
                if let Some(turn) = session.accept_fallback(&mut context).await? {
                    render(&interpret(&turn));
                }
            }
            ("/no", _) => {
                let turn = session.decline_fallback().await;
                render(&interpret(&turn));
            }
            _ => {
                session.stage_text(line).await;
                println!("analyzing...");
                if let Some(turn) = session.submit_staged(&mut context).await? {
                    render(&interpret(&turn));
                }
            }
        }
    }

    Ok(())
}

async fn prompt_line(
    input: &mut Input,
    label: &str,
) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
    use std::io::Write;
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

fn render(reply: &Reply) {
    match reply {
        Reply::Plain(text) => println!("{text}"),
        Reply::KeySelection(text) => println!("{text}\n  -> /key to configure a key"),
        Reply::FallbackOffer(text) => println!("{text}\n  -> /yes to broaden, /no to stay strict"),
        Reply::DomainError(text) => println!("ACCESS DENIED: {text}"),
        Reply::Structured(reply) => {
            for block in &reply.blocks {
                match block {
                    Block::Prose(text) => print!("{text}"),
                    Block::Chart(chart) => render_chart(&chart.spec),
                }
            }
            println!();
            if let Some(confidence) = reply.confidence {
                let badge = if confidence.is_high() { "+" } else { "~" };
                println!("[{badge}] Confidence: {confidence}");
            }
            for source in &reply.sources {
                println!("  source: {} <{}>", source.display_title(), source.uri);
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn render_chart(spec: &ChartSpec) {
    println!("\n== {} ==", spec.display_title());
    match spec.kind {
        ChartKind::Pie => match spec.pie_slices() {
            Some(slices) => {
                for (entry, share) in spec.data.iter().zip(slices) {
                    println!("{:>12} {:5.1}%", entry.label, share * 100.0);
                }
            }
            None => println!("(no data)"),
        },
        ChartKind::Bar => match spec.bar_lengths() {
            Some(lengths) => {
                for (entry, length) in spec.data.iter().zip(lengths) {
                    let bar = "#".repeat((length * BAR_WIDTH).round().max(0.0) as usize);
                    println!("{:>12} {bar} {}", entry.label, entry.value);
                }
            }
            None => println!("(no data)"),
        },
        ChartKind::Line => {
            let line: String = spec
                .line_points()
                .iter()
                .map(|(_, y)| SPARKS[(y * 7.0).round().clamp(0.0, 7.0) as usize])
                .collect();
            let first = spec.data.first().map_or("", |entry| entry.label.as_str());
            let last = spec.data.last().map_or("", |entry| entry.label.as_str());
            println!("{first} {line} {last}");
        }
    }
}
