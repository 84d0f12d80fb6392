use std::env;
use std::fs;

use catalog::CategoryIndex;
use formats::CategoryIndexDoc;
use foundation::{DEFAULT_LANGUAGE, LngLat};
use permalink::ViewState;
use serde_json::json;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "decode" => cmd_decode(args),
        "encode" => cmd_encode(args),
        "index" => cmd_index(args),
        _ => Err(usage()),
    }
}

fn cmd_decode(args: Vec<String>) -> Result<(), String> {
    // placegraph decode '<fragment>'
    if args.len() != 1 {
        return Err(usage());
    }

    let state = permalink::decode(&args[0]);
    let doc = json!({
        "zoom": state.zoom,
        "center": state.center.map(|c| [c.lng, c.lat]),
        "category": state.category,
        "filter": state.filter,
    });
    let payload = serde_json::to_string_pretty(&doc).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn cmd_encode(args: Vec<String>) -> Result<(), String> {
    // placegraph encode [--zoom Z] [--center LNG,LAT] [--category ID] [--filter TEXT]
    let mut state = ViewState::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].clone();
        i += 1;
        if i >= args.len() {
            return Err(format!("{flag} requires a value"));
        }
        let value = &args[i];
        match flag.as_str() {
            "--zoom" => {
                let zoom: f64 = value
                    .parse()
                    .map_err(|e| format!("--zoom {value}: {e}"))?;
                if !zoom.is_finite() {
                    return Err(format!("--zoom {value}: not a finite number"));
                }
                state.zoom = Some(zoom);
            }
            "--center" => state.center = Some(parse_center(value)?),
            "--category" => state.category = Some(value.clone()),
            "--filter" => state.filter = Some(value.clone()),
            other => return Err(format!("unknown arg: {other}\n\n{}", usage())),
        }
        i += 1;
    }

    println!("{}", permalink::encode(&state));
    Ok(())
}

fn parse_center(value: &str) -> Result<LngLat, String> {
    let mut parts = value.split(',');
    let (Some(lng), Some(lat)) = (parts.next(), parts.next()) else {
        return Err(format!("--center {value}: expected LNG,LAT"));
    };
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("--center longitude {lng}: {e}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("--center latitude {lat}: {e}"))?;
    let center = LngLat::new(lng, lat);
    if !center.is_finite() {
        return Err(format!("--center {value}: not finite"));
    }
    Ok(center)
}

fn cmd_index(args: Vec<String>) -> Result<(), String> {
    // placegraph index <index.json> [--lang XX]
    if args.is_empty() {
        return Err(usage());
    }

    let path = args[0].clone();
    let mut language = DEFAULT_LANGUAGE.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--lang" => {
                i += 1;
                if i >= args.len() {
                    return Err("--lang requires a value".to_string());
                }
                language = args[i].clone();
            }
            s => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    let payload = fs::read_to_string(&path).map_err(|e| format!("read {path}: {e}"))?;
    let doc =
        CategoryIndexDoc::from_json_str(&payload).map_err(|e| format!("parse {path}: {e}"))?;
    let skipped = doc.skipped;
    let index = CategoryIndex::from_doc(doc);

    for (id, label) in index.sorted_entries(&language) {
        println!("{id}\t{label}");
    }
    eprintln!("{} categories ({} skipped)", index.len(), skipped);
    Ok(())
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "placegraph".to_string());
    format!(
        "Usage:\n  {exe} decode '<fragment>'\n  {exe} encode [--zoom Z] [--center LNG,LAT] [--category ID] [--filter TEXT]\n  {exe} index <index.json> [--lang XX]\n\nNotes:\n- decode prints the parsed view state as JSON; malformed fields come back null.\n- encode prints the canonical fragment: 5 significant digits, keys ordered zoom, center, category, filter.\n- index validates geojson/index.json and prints id<TAB>label, sorted the way the selector sorts.\n"
    )
}
