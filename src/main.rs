use ninja_info::config::Config;
use ninja_info::forward::{ForwardClient, Segment};
use ninja_info::metrics;
use ninja_info::plugin::{NinjaInfoPlugin, Reply};

/// Flags that take a value and so are not part of the query.
const VALUE_FLAGS: &[&str] = &["--group", "--timeout", "--avatar-dir"];

fn query_from_args(args: &[String]) -> String {
    let mut words = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            words.push(arg.as_str());
        }
    }
    words.join(" ")
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Plain(text) => println!("{text}"),
        Reply::Forward(nodes) => {
            for node in nodes {
                for segment in &node.content {
                    match segment {
                        Segment::Text(text) => println!("{text}"),
                        Segment::Image(path) => println!("[avatar] {}", path.display()),
                    }
                }
                println!();
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    metrics::register_metrics();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load();
    let query = query_from_args(&args);
    let single = args.iter().any(|a| a == "--single");
    let group_id = Config::parse_cli_value(&args, "--group").and_then(|v| v.parse::<i64>().ok());

    let plugin = match NinjaInfoPlugin::new(&config) {
        Ok(plugin) => plugin,
        Err(e) => {
            tracing::error!("Failed to initialize ninja info plugin: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Received ninja query: {query:?}");
    let replies = if single {
        vec![plugin.describe(&config.bot_self_id, &query).await]
    } else {
        plugin.lookup(&config.bot_self_id, &query).await
    };

    let forward = match (&config.napcat_api_url, group_id) {
        (Some(api_url), Some(group_id)) => match ForwardClient::new(api_url, config.timeout) {
            Ok(client) => Some((client, group_id)),
            Err(e) => {
                tracing::error!("Failed to build forward client: {e}");
                None
            }
        },
        _ => None,
    };

    for reply in &replies {
        match (&forward, reply) {
            (Some((client, group_id)), Reply::Forward(nodes)) => {
                if let Err(e) = client.send_group_forward(*group_id, nodes).await {
                    tracing::error!("Forward delivery to group {group_id} failed: {e}");
                }
            }
            _ => print_reply(reply),
        }
    }

    if args.iter().any(|a| a == "--metrics") {
        print!("{}", metrics::gather_metrics());
    }
}
