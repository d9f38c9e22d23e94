use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value};
use walkdir::WalkDir;

use pokewiki_sdk::{ImageUpload, PageFilter, PageRecord, PokedexEntry, SortDirection, Wiki};
use pokewiki_server::{PokewikiServer, ServerConfig};
use pokewiki_store::ObjectStoreExt;
use pokewiki_types::{keys, Leaderboard};

use crate::cli::*;

/// Used when neither `--root` nor the config file names a data directory.
const DEFAULT_DATA_ROOT: &str = "pokewiki-data";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    let root = cli
        .root
        .clone()
        .or_else(|| config.data_root.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT));

    match cli.command {
        Command::Serve(args) => cmd_serve(config, root, args),
        command => {
            let wiki = Wiki::open(&root, config.wiki.clone())
                .with_context(|| format!("opening wiki at {}", root.display()))?;
            run_wiki_command(&wiki, cli.format, command)
        }
    }
}

fn run_wiki_command(wiki: &Wiki, format: OutputFormat, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve(_) => bail!("serve does not run against an open wiki"),
        Command::Signup(args) => cmd_signup(wiki, args),
        Command::Login(args) => cmd_login(wiki, args),
        Command::Page(args) => cmd_page(wiki, format, args.action),
        Command::Leaderboard(args) => cmd_leaderboard(wiki, format, args),
        Command::Score(args) => cmd_score(wiki, format, args),
        Command::Seed(args) => cmd_seed(wiki, args),
    }
}

fn cmd_serve(mut config: ServerConfig, root: PathBuf, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    config.data_root = if args.memory { None } else { Some(root) };

    let server = PokewikiServer::new(config)?;
    let storage = match &server.config().data_root {
        Some(root) => root.display().to_string(),
        None => "memory".to_string(),
    };
    println!(
        "Pokewiki server on {} (data: {})",
        server.config().bind_addr.to_string().bold(),
        storage
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_signup(wiki: &Wiki, args: AccountArgs) -> anyhow::Result<()> {
    if !wiki.credentials().register(&args.username, &args.password)? {
        bail!("username {} is already taken", args.username);
    }
    println!("{} Created account {}", "✓".green().bold(), args.username.bold());
    Ok(())
}

fn cmd_login(wiki: &Wiki, args: AccountArgs) -> anyhow::Result<()> {
    if !wiki.credentials().authenticate(&args.username, &args.password)? {
        bail!("wrong username or password");
    }
    println!("{} Signed in as {}", "✓".green().bold(), args.username.bold());
    Ok(())
}

// ---- Pages ----

fn cmd_page(wiki: &Wiki, format: OutputFormat, action: PageAction) -> anyhow::Result<()> {
    let pages = wiki.pages();
    match action {
        PageAction::Show { name, image } => {
            let Some(record) = pages.page(&name)? else {
                bail!("no page named {name:?}");
            };
            let encoded = if image { pages.page_image(&record)? } else { None };
            print_page(format, &record, encoded.as_deref())
        }
        PageAction::List => print_keys(format, &pages.list_pages()?),
        PageAction::Search { query } => print_keys(format, &pages.search_pages(&query)?),
        PageAction::Filter(args) => {
            let filter = PageFilter {
                name: args.name,
                kind: args.kind,
                region: args.region,
                nature: args.nature,
            }
            .normalized();
            print_keys(format, &pages.find_pages(&filter)?)
        }
        PageAction::Sort { field, direction } => {
            let direction: SortDirection = direction.parse()?;
            print_keys(format, &pages.sort_pages(&field, direction)?)
        }
        PageAction::Upload(args) => cmd_upload(wiki, args),
    }
}

fn cmd_upload(wiki: &Wiki, args: UploadArgs) -> anyhow::Result<()> {
    let mut record = PageRecord::new(args.name.trim());
    record.kind = args.kind;
    record.region = args.region;
    record.nature = args.nature;
    if let Some(level) = args.level {
        record = record.with_attribute("level", level);
    }
    for raw in &args.attributes {
        let (field, value) = parse_attribute(raw)?;
        record = record.with_attribute(field, value);
    }

    let image = match &args.image {
        Some(path) => Some(read_image(path)?),
        None => None,
    };

    let key = record.key();
    if !wiki.pages().put_page(record, image.as_ref())? {
        bail!("a page named {} already exists", args.name);
    }
    println!("{} Uploaded {}", "✓".green().bold(), key.yellow());
    Ok(())
}

/// Split `field=value`. Numeric values are stored as JSON numbers.
fn parse_attribute(raw: &str) -> anyhow::Result<(String, Value)> {
    let Some((field, value)) = raw.split_once('=') else {
        bail!("expected key=value, got {raw:?}");
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("empty field name in {raw:?}");
    }
    if ["name", "type", "region", "nature", "image-name", "image-type"].contains(&field) {
        bail!("{field} cannot be set with --attr");
    }
    let value = value.trim();
    let value = if let Ok(n) = value.parse::<i64>() {
        Value::from(n)
    } else if let Some(n) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        Value::Number(n)
    } else {
        Value::String(value.to_string())
    };
    Ok((field.to_string(), value))
}

fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("{} has no usable file name", path.display());
    };
    Ok(ImageUpload::new(filename, content_type_for(path), data))
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn print_page(format: OutputFormat, record: &PageRecord, image: Option<&str>) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "page": record, "image": image }))?);
        }
        OutputFormat::Text => {
            println!("{}", record.name.bold());
            for (label, value) in [("type", &record.kind), ("region", &record.region), ("nature", &record.nature)] {
                if let Some(value) = value {
                    println!("  {label}: {}", value.cyan());
                }
            }
            for (field, value) in &record.attributes {
                println!("  {field}: {value}");
            }
            if let Some(name) = &record.image_name {
                println!("  image: {}", name.blue());
            }
            if let Some(image) = image {
                println!("{image}");
            }
        }
    }
    Ok(())
}

fn print_keys(format: OutputFormat, keys: &[String]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(keys)?),
        OutputFormat::Text if keys.is_empty() => println!("No pages."),
        OutputFormat::Text => {
            for key in keys {
                println!("{}", key.yellow());
            }
        }
    }
    Ok(())
}

// ---- Game ----

fn cmd_leaderboard(wiki: &Wiki, format: OutputFormat, args: LeaderboardArgs) -> anyhow::Result<()> {
    if args.verify {
        let count = wiki.game().verify_leaderboard()?;
        println!("{} Leaderboard consistent ({count} entries)", "✓".green().bold());
        return Ok(());
    }

    let mut entries = wiki.game().leaderboard()?;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Leaderboard::new(entries))?);
        }
        OutputFormat::Text if entries.is_empty() => println!("No ranked players."),
        OutputFormat::Text => {
            for entry in entries {
                let rank = entry.rank.map_or_else(|| "-".to_string(), |r| format!("#{r}"));
                println!("{:>5}  {:<20} {}", rank.yellow().bold(), entry.name, entry.points);
            }
        }
    }
    Ok(())
}

fn cmd_score(wiki: &Wiki, format: OutputFormat, args: ScoreArgs) -> anyhow::Result<()> {
    let game = wiki.game();
    let player = if args.add {
        game.add_points(&args.username, args.points)?
    } else {
        game.update_points(&args.username, args.points)?
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&player)?),
        OutputFormat::Text => {
            let rank = player.rank.map_or_else(|| "unranked".to_string(), |r| format!("#{r}"));
            println!(
                "{} {} now has {} points ({})",
                "✓".green().bold(),
                player.name.bold(),
                player.points,
                rank.yellow()
            );
        }
    }
    Ok(())
}

// ---- Seeding ----

fn cmd_seed(wiki: &Wiki, args: SeedArgs) -> anyhow::Result<()> {
    if args.pokedex.is_none() && args.categories.is_none() && args.images.is_none() {
        bail!("nothing to seed: pass --pokedex, --categories or --images");
    }
    let store = wiki.store();
    let bucket = wiki.config().content_bucket.as_str();

    if let Some(path) = &args.pokedex {
        let entries: Vec<PokedexEntry> = read_json(path)?;
        store.put_json(bucket, keys::POKEDEX_KEY, &entries)?;
        println!("{} Pokedex: {} entries", "✓".green(), entries.len());
    }

    if let Some(path) = &args.categories {
        let categories: Value = read_json(path)?;
        store.put_json(bucket, keys::CATEGORIES_KEY, &categories)?;
        println!("{} Categories loaded", "✓".green());
    }

    if let Some(dir) = &args.images {
        let mut loaded = 0usize;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(key) = pokedex_image_key_for(entry.path()) else {
                tracing::warn!(path = %entry.path().display(), "skipping file with unrecognized name");
                continue;
            };
            let data = std::fs::read(entry.path())?;
            store.put(bucket, &key, &data, content_type_for(entry.path()))?;
            loaded += 1;
        }
        println!("{} Images: {loaded} loaded", "✓".green());
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// `pokeball.png` and `<id>.png` (any zero padding) map to their pokedex
/// image keys.
fn pokedex_image_key_for(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name == "pokeball.png" {
        return Some(keys::POKEBALL_KEY.to_string());
    }
    let id: u32 = name.strip_suffix(".png")?.parse().ok()?;
    Some(keys::pokedex_image_key(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pokewiki_store::ObjectStore;

    fn run(wiki: &Wiki, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["pokewiki"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        run_wiki_command(wiki, cli.format, cli.command)
    }

    #[test]
    fn signup_and_login() {
        let wiki = Wiki::in_memory().unwrap();
        run(&wiki, &["signup", "ash", "pikachu"]).unwrap();
        assert!(run(&wiki, &["signup", "ash", "other"]).is_err());
        run(&wiki, &["login", "ash", "pikachu"]).unwrap();
        let err = run(&wiki, &["login", "ash", "raichu"]).unwrap_err();
        assert_eq!(err.to_string(), "wrong username or password");
    }

    #[test]
    fn upload_with_attributes_and_image() {
        let wiki = Wiki::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("abra.png");
        std::fs::write(&image, b"\x89PNG").unwrap();

        run(
            &wiki,
            &[
                "page", "upload", "Abra", "--type", "Psychic", "--level", "16",
                "--attr", "attack=20", "--attr", "ability=Synchronize",
                "--image", image.to_str().unwrap(),
            ],
        )
        .unwrap();

        let record = wiki.pages().page("abra").unwrap().unwrap();
        assert_eq!(record.kind.as_deref(), Some("Psychic"));
        assert_eq!(record.level(), Some(16.0));
        assert_eq!(record.attributes["attack"], json!(20));
        assert_eq!(record.attributes["ability"], json!("Synchronize"));
        assert_eq!(record.image_type.as_deref(), Some("image/png"));

        assert!(run(&wiki, &["page", "upload", "ABRA"]).is_err());
        run(&wiki, &["--format", "json", "page", "show", "abra", "--image"]).unwrap();
        run(&wiki, &["page", "sort", "--direction", "HighestToLowest"]).unwrap();
        assert!(run(&wiki, &["page", "sort", "--direction", "sideways"]).is_err());
    }

    #[test]
    fn attribute_parsing() {
        assert_eq!(parse_attribute("speed=90").unwrap(), ("speed".into(), json!(90)));
        assert_eq!(parse_attribute("weight = 19.5").unwrap(), ("weight".into(), json!(19.5)));
        assert_eq!(parse_attribute("color=pink").unwrap(), ("color".into(), json!("pink")));
        assert!(parse_attribute("novalue").is_err());
        assert!(parse_attribute("=5").is_err());
        assert!(parse_attribute("type=Fire").is_err());
    }

    #[test]
    fn score_and_verify_leaderboard() {
        let wiki = Wiki::in_memory().unwrap();
        run(&wiki, &["signup", "ash", "pikachu"]).unwrap();
        run(&wiki, &["signup", "misty", "starmie"]).unwrap();
        run(&wiki, &["score", "ash", "100"]).unwrap();
        run(&wiki, &["score", "misty", "150"]).unwrap();
        run(&wiki, &["score", "ash", "-75", "--add"]).unwrap();
        run(&wiki, &["leaderboard", "--verify"]).unwrap();
        run(&wiki, &["--format", "json", "leaderboard", "-n", "1"]).unwrap();

        let board = wiki.game().leaderboard().unwrap();
        assert_eq!(board[0].name, "misty");
        assert_eq!(board[1].name, "ash");
        assert_eq!(board[1].points, 25);

        assert!(run(&wiki, &["score", "gary", "10"]).is_err());
    }

    #[test]
    fn seed_loads_pokedex_and_images() {
        let wiki = Wiki::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let pokedex = dir.path().join("pokedex.json");
        std::fs::write(&pokedex, r#"[{"name": "Bulbasaur", "id": 1}, {"name": "Ivysaur", "id": 2}]"#).unwrap();
        let categories = dir.path().join("categories.json");
        std::fs::write(&categories, r#"{"type": ["Grass"]}"#).unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir(&images).unwrap();
        std::fs::write(images.join("001.png"), b"one").unwrap();
        std::fs::write(images.join("2.png"), b"two").unwrap();
        std::fs::write(images.join("pokeball.png"), b"ball").unwrap();
        std::fs::write(images.join("README"), b"skip me").unwrap();

        run(
            &wiki,
            &[
                "seed",
                "--pokedex", pokedex.to_str().unwrap(),
                "--categories", categories.to_str().unwrap(),
                "--images", images.to_str().unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(wiki.game().pokedex_entry(2).unwrap().unwrap().name, "Ivysaur");
        assert_eq!(wiki.pages().categories().unwrap(), Some(json!({"type": ["Grass"]})));
        let store = wiki.store();
        assert_eq!(store.get("wiki-content", "master_pokedex/images/002.png").unwrap().unwrap(), b"two");
        assert!(store.exists("wiki-content", "master_pokedex/images/001.png").unwrap());
        assert!(store.exists("wiki-content", "master_pokedex/images/pokeball.png").unwrap());
        assert_eq!(store.list("wiki-content", "master_pokedex/images/").unwrap().len(), 3);

        assert!(run(&wiki, &["seed"]).is_err());
    }

    #[test]
    fn image_keys_from_file_names() {
        assert_eq!(
            pokedex_image_key_for(Path::new("/x/25.png")).as_deref(),
            Some("master_pokedex/images/025.png")
        );
        assert_eq!(
            pokedex_image_key_for(Path::new("pokeball.png")).as_deref(),
            Some("master_pokedex/images/pokeball.png")
        );
        assert!(pokedex_image_key_for(Path::new("pikachu.png")).is_none());
        assert!(pokedex_image_key_for(Path::new("25.jpg")).is_none());
    }
}
