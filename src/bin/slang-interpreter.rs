use clap::{Arg, ArgAction, Command};
use slang_interpreter::{
    InterpretationResult, InterpreterConfig, MockDictionary, MockLanguageModel, TextInterpreter,
    WordListFilter,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("slang-interpreter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interpret slang-laden text such as song lyrics")
        .arg(
            Arg::new("text")
                .help("Text to interpret once; starts an interactive session when omitted")
                .index(1),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .help("Override the language model name"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Run offline against a small built-in slang glossary")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print each result as a JSON object")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline stages to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let use_mock = matches.get_flag("mock");
    let as_json = matches.get_flag("json");

    let interpreter = if use_mock {
        let mut config = InterpreterConfig::default();
        if let Some(model) = matches.get_one::<String>("model") {
            config = config.with_model(model.as_str());
        }
        TextInterpreter::new(
            config,
            Arc::new(WordListFilter::with_default_words()?),
            Arc::new(MockLanguageModel::offline()),
            Arc::new(MockDictionary::offline()),
        )?
    } else {
        let mut config = match InterpreterConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {}", e);
                eprintln!("   Set it with: export CLAUDE_API_KEY=your_api_key");
                eprintln!("   Or use --mock to run without network access");
                return Err(e.into());
            }
        };
        if let Some(model) = matches.get_one::<String>("model") {
            config = config.with_model(model.as_str());
        }
        TextInterpreter::from_config(config)?
    };

    if let Some(text) = matches.get_one::<String>("text") {
        let result = interpreter.process(text).await?;
        print_result(&result, as_json)?;
        return Ok(());
    }

    repl(&interpreter, as_json).await
}

async fn repl(
    interpreter: &TextInterpreter,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("Enter text (or 'quit' to exit): ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);
        if input.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        match interpreter.process(input).await {
            Ok(result) => print_result(&result, as_json)?,
            Err(e) => eprintln!("❌ {}", e),
        }
        println!();
    }

    Ok(())
}

fn print_result(result: &InterpretationResult, as_json: bool) -> io::Result<()> {
    if as_json {
        let json = serde_json::to_string(result).map_err(io::Error::other)?;
        println!("{}", json);
    } else {
        println!("Original: {}", result.original_text);
        println!("Interpretation: {}", result.interpretation);
    }
    Ok(())
}
