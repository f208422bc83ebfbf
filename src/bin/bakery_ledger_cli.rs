use std::{
    env,
    io::{self, Read},
    path::PathBuf,
    process,
};

use bakery_ledger::{
    admin::{AdminResponse, BackOffice, SessionValidator, StaticTokenValidator, TrustedLocal},
    bakery_config::ConfigManager,
    bakery_storage_json::JsonRecordStore,
    errors::{AppError, AppResult},
    init_with_filter,
    utils::build_info,
};
use serde_json::{Map, Value};

fn main() {
    match run() {
        Ok(response) if response.success => {}
        Ok(_) => process::exit(1),
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

struct Invocation {
    data_dir: Option<PathBuf>,
    token: Option<String>,
    raw_csv: bool,
    action: String,
    fields: Option<String>,
}

fn run() -> AppResult<AdminResponse> {
    let invocation = parse_args(env::args().skip(1))?;

    let config = ConfigManager::from_env()?.load_or_init()?;

    let data_dir = invocation
        .data_dir
        .clone()
        .unwrap_or_else(|| config.resolve_data_dir());
    let store = JsonRecordStore::new(data_dir)?;
    init_with_filter(&config.log_filter);
    let sessions: Box<dyn SessionValidator> = if config.admin_tokens.is_empty() {
        Box::new(TrustedLocal)
    } else {
        Box::new(StaticTokenValidator::new(config.admin_tokens.clone()))
    };
    let office = BackOffice::from_config(config, Box::new(store), sessions);

    let body = request_body(&invocation)?;
    let response = office.handle_json(&body);

    let csv = response
        .data
        .as_ref()
        .and_then(|data| data.get("csv"))
        .and_then(Value::as_str);
    match csv {
        Some(csv) if invocation.raw_csv && response.success => print!("{csv}"),
        _ => println!("{}", serde_json::to_string_pretty(&response)?),
    }
    Ok(response)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> AppResult<Invocation> {
    let mut data_dir = None;
    let mut token = None;
    let mut raw_csv = false;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("{}", build_info::current().describe());
                process::exit(0);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--data-dir" => data_dir = Some(PathBuf::from(required_value(&mut args, &arg)?)),
            "--token" => token = Some(required_value(&mut args, &arg)?),
            "--csv" => raw_csv = true,
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(action) = positional.next() else {
        print_usage();
        process::exit(1);
    };
    Ok(Invocation {
        data_dir,
        token,
        raw_csv,
        action,
        fields: positional.next(),
    })
}

fn required_value(args: &mut impl Iterator<Item = String>, flag: &str) -> AppResult<String> {
    args.next()
        .ok_or_else(|| AppError::Request(format!("{flag} needs a value")))
}

/// Builds the JSON request: either the whole body from stdin (`-`), or the
/// action name merged with an optional JSON object of fields.
fn request_body(invocation: &Invocation) -> AppResult<String> {
    let mut request = if invocation.action == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| AppError::Request(err.to_string()))?;
        parse_object(&buffer)?
    } else {
        let mut fields = match &invocation.fields {
            Some(raw) => parse_object(raw)?,
            None => Map::new(),
        };
        fields.insert("action".into(), Value::String(invocation.action.clone()));
        fields
    };

    if let Some(token) = &invocation.token {
        request.insert("token".into(), Value::String(token.clone()));
    }
    Ok(Value::Object(request).to_string())
}

fn parse_object(raw: &str) -> AppResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Request("request fields must be a JSON object".into())),
        Err(err) => Err(AppError::Request(err.to_string())),
    }
}

fn print_usage() {
    eprintln!(
        "Usage:\n  bakery_ledger_cli [--data-dir <dir>] [--token <token>] [--csv] <action> [<json-fields>]\n  bakery_ledger_cli [--data-dir <dir>] -   # read the full JSON request from stdin\n  bakery_ledger_cli --version\n\nActions: {}",
        bakery_ledger::admin::AdminAction::NAMES.join(", ")
    );
}
