use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wordrush::prelude::*;

/// The catalogue the binary serves: a JSON file when `WORDRUSH_WORDS` is
/// set, the built-in list otherwise.
enum Catalogue {
    Builtin(StaticWordSource),
    File(JsonFileWordSource),
}

impl WordSource for Catalogue {
    async fn fetch(&self) -> Result<Vec<WordRecord>, SupplyError> {
        match self {
            Self::Builtin(source) => source.fetch().await,
            Self::File(source) => source.fetch().await,
        }
    }
}

const BUILTIN_WORDS: &[(&str, &str)] = &[
    ("apple", "A fruit that keeps the doctor away"),
    ("bridge", "Crosses a river"),
    ("candle", "Wax and a wick"),
    ("desert", "Dry and sandy"),
    ("eclipse", "The moon gets in the way"),
    ("falcon", "A fast bird of prey"),
    ("glacier", "A slow river of ice"),
    ("harbor", "Where ships rest"),
    ("island", "Land surrounded by water"),
    ("jigsaw", "A puzzle in pieces"),
    ("kettle", "Boils water for tea"),
    ("lantern", "A portable light"),
    ("marble", "Stone for statues"),
    ("nectar", "What bees collect"),
    ("orchard", "Rows of fruit trees"),
    ("pepper", "Salt's companion"),
    ("quartz", "A common crystal"),
    ("rocket", "Goes to space"),
    ("saddle", "Sits on a horse"),
    ("thunder", "Follows the lightning"),
    ("umbrella", "Keeps the rain off"),
    ("violin", "Played with a bow"),
    ("walrus", "Tusked sea mammal"),
    ("yogurt", "Cultured milk"),
    ("zipper", "Closes a jacket"),
];

#[tokio::main]
async fn main() -> Result<(), WordrushError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordrush=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let catalogue = match &config.words_path {
        Some(path) => Catalogue::File(JsonFileWordSource::new(path.clone())),
        None => Catalogue::Builtin(StaticWordSource::from_pairs(BUILTIN_WORDS.iter().copied())),
    };

    let server = WordrushServerBuilder::new()
        .bind(&config.bind)
        .registry_config(config.registry)
        .build(catalogue)
        .await?;
    server.run().await
}
