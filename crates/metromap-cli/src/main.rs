use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use metromap::Network;
use metromap::render::raster::{RasterError, RasterOptions, svg_to_jpeg, svg_to_png};
use metromap::render::{
    Canvas, DeterministicTextMeasurer, LinearMapOutcome, LinearMapRequest, RenderContext,
    RenderError, RenderOptions, canvas_to_svg, linear_map, load_network_assets, render_map,
    render_sign,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Model(metromap::Error),
    Render(RenderError),
    Raster(RasterError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Model(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<metromap::Error> for CliError {
    fn from(value: metromap::Error) -> Self {
        Self::Model(value)
    }
}

impl From<RenderError> for CliError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Map,
    Linear,
    Signs,
}

#[derive(Debug, Clone, Copy, Default)]
enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Svg,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
struct Args {
    command: Command,
    input: PathBuf,
    assets: PathBuf,
    out: PathBuf,
    format: OutputFormat,
    scale: f32,
    font_family: String,
    line: Option<String>,
    station: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Command::Map,
            input: PathBuf::from("input/map_data.json"),
            assets: PathBuf::from("images"),
            out: PathBuf::from("output"),
            format: OutputFormat::Png,
            scale: 1.0,
            font_family: "sans-serif".to_string(),
            line: None,
            station: None,
        }
    }
}

fn usage() -> &'static str {
    "metromap-cli\n\
\n\
USAGE:\n\
  metromap-cli map    [--input <map.json>] [--assets <dir>] [--out <dir>] [--format png|jpg|svg] [--scale <n>]\n\
  metromap-cli linear [--input <map.json>] [--assets <dir>] [--out <dir>] [--format png|jpg|svg] [--line <name>] [--station <name>]\n\
  metromap-cli signs  [--input <map.json>] [--assets <dir>] [--out <dir>] [--format png|jpg|svg] [--line <name>] [--station <name>]\n\
\n\
NOTES:\n\
  - map writes <out>/metro_map.<ext>.\n\
  - linear writes one strip per line, boarding station and direction:\n\
    <out>/linear_<line>_<station>_<0|1>.<ext>; directions with no service\n\
    get the configured no-service placeholder.\n\
  - signs writes <out>/sign_<line>_<station>.<ext>.\n\
  - --line/--station restrict linear and signs to matching lines/stations.\n\
  - Filenames are transliterated to ASCII.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_given = false;

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "map" => {
                args.command = Command::Map;
                command_given = true;
            }
            "linear" => {
                args.command = Command::Linear;
                command_given = true;
            }
            "signs" => {
                args.command = Command::Signs;
                command_given = true;
            }
            "--input" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.input = PathBuf::from(path);
            }
            "--assets" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.assets = PathBuf::from(path);
            }
            "--out" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = PathBuf::from(path);
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = fmt
                    .parse::<OutputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.scale.is_finite() && args.scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--font-family" => {
                let Some(family) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.font_family = family.clone();
            }
            "--line" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.line = Some(name.clone());
            }
            "--station" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.station = Some(name.clone());
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if !command_given {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

/// ASCII-safe output filenames: spaces and newlines become underscores,
/// Cyrillic is transliterated, anything else non-ASCII is dropped.
fn format_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ' ' | '\n' => out.push('_'),
            _ => match transliterate(ch) {
                Some(s) => out.push_str(s),
                None if ch.is_ascii() => out.push(ch),
                None => {}
            },
        }
    }
    out
}

fn transliterate(ch: char) -> Option<&'static str> {
    Some(match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "ju",
        'я' => "ja",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' | 'Ё' | 'Э' => "E",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "I",
        'Й' => "J",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Sch",
        'Ъ' | 'Ь' => "",
        'Ы' => "Y",
        'Ю' => "Ju",
        'Я' => "Ja",
        _ => return None,
    })
}

fn raster_options(args: &Args, network: &Network) -> RasterOptions {
    let font_path = args.assets.join(&network.font_filename);
    RasterOptions {
        scale: args.scale,
        background: None,
        font_file: font_path.exists().then_some(font_path),
        font_family: args.font_family.clone(),
        ..RasterOptions::default()
    }
}

fn write_canvas(
    canvas: &Canvas,
    ctx: &RenderContext,
    raster: &RasterOptions,
    format: OutputFormat,
    path: &Path,
) -> Result<(), CliError> {
    let svg = canvas_to_svg(canvas, ctx.assets, &ctx.options.font_family);
    match format {
        OutputFormat::Svg => std::fs::write(path, svg)?,
        OutputFormat::Png => std::fs::write(path, svg_to_png(&svg, raster)?)?,
        OutputFormat::Jpeg => std::fs::write(path, svg_to_jpeg(&svg, raster)?)?,
    }
    Ok(())
}

/// The no-service placeholder is a prebuilt image; raster formats get its
/// bytes verbatim, SVG output embeds it.
fn write_no_service(
    ctx: &RenderContext,
    args: &Args,
    format: OutputFormat,
    path: &Path,
) -> Result<bool, CliError> {
    let Some(name) = &ctx.network.no_service_filename else {
        return Ok(false);
    };
    match format {
        OutputFormat::Svg => {
            let id = ctx.assets.require(name)?;
            let asset = ctx.assets.get(id);
            let (w, h) = (asset.width, asset.height);
            let svg = format!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\"><image href=\"{}\" width=\"{w}\" height=\"{h}\"/></svg>",
                asset.data_uri()
            );
            std::fs::write(path, svg)?;
        }
        OutputFormat::Png | OutputFormat::Jpeg => {
            std::fs::copy(args.assets.join(name), path)?;
        }
    }
    Ok(true)
}

fn selected_lines<'a>(network: &'a Network, args: &Args) -> Result<Vec<&'a metromap::Line>, CliError> {
    match &args.line {
        Some(name) => Ok(vec![network.line(name)?]),
        None => Ok(network.lines().iter().collect()),
    }
}

fn selected_stations<'a>(
    line: &'a metromap::Line,
    args: &Args,
) -> Result<Vec<&'a metromap::StationElement>, CliError> {
    match &args.station {
        Some(name) => {
            let (_, station) = line.station(name).ok_or_else(|| {
                metromap::Error::StationNotFound {
                    line: line.name.clone(),
                    station: name.clone(),
                }
            })?;
            Ok(vec![station])
        }
        None => Ok(line.stations().map(|(_, s)| s).collect()),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let started = Instant::now();

    let text = std::fs::read_to_string(&args.input)?;
    let network = Network::from_json_str(&text)?;
    let assets = load_network_assets(&network, &args.assets)?;
    let options = RenderOptions {
        text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        font_family: args.font_family.clone(),
    };
    let ctx = RenderContext::new(&network, &assets, &options);
    let raster = raster_options(&args, &network);
    let ext = args.format.extension();

    std::fs::create_dir_all(&args.out)?;

    match args.command {
        Command::Map => {
            let canvas = render_map(&ctx)?;
            let path = args.out.join(format!("metro_map.{ext}"));
            write_canvas(&canvas, &ctx, &raster, args.format, &path)?;
        }
        Command::Linear => {
            for line in selected_lines(&network, &args)? {
                for station in selected_stations(line, &args)? {
                    for reverse in [false, true] {
                        let request = LinearMapRequest {
                            reverse,
                            start_station: Some(station.name.clone()),
                        };
                        let path = args.out.join(format!(
                            "linear_{}_{}_{}.{ext}",
                            format_filename(&line.name),
                            format_filename(&station.name),
                            u8::from(reverse),
                        ));
                        match linear_map(&ctx, &line.name, &request)? {
                            LinearMapOutcome::Map(canvas) => {
                                write_canvas(&canvas, &ctx, &raster, args.format, &path)?;
                            }
                            LinearMapOutcome::NoService => {
                                if !write_no_service(&ctx, &args, args.format, &path)? {
                                    eprintln!(
                                        "no service for {} from {} (direction {}), and no placeholder is configured; skipping",
                                        line.name,
                                        station.name,
                                        u8::from(reverse),
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
        Command::Signs => {
            for line in selected_lines(&network, &args)? {
                for station in selected_stations(line, &args)? {
                    let canvas = render_sign(&ctx, &line.name, &station.name)?;
                    let path = args.out.join(format!(
                        "sign_{}_{}.{ext}",
                        format_filename(&line.name),
                        format_filename(&station.name),
                    ));
                    write_canvas(&canvas, &ctx, &raster, args.format, &path)?;
                }
            }
        }
    }

    println!(
        "Generating completed in {} ms",
        started.elapsed().as_millis()
    );
    Ok(())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_transliterate_to_ascii() {
        assert_eq!(format_filename("Первый диаметр"), "Pervyj_diametr");
        assert_eq!(format_filename("Щёлковская"), "Schelkovskaja");
        assert_eq!(format_filename("Улица 1905 года"), "Ulica_1905_goda");
        assert_eq!(format_filename("Бульвар\nРокоссовского"), "Bulvar_Rokossovskogo");
    }

    #[test]
    fn unknown_flags_are_usage_errors() {
        let argv: Vec<String> = ["metromap-cli", "map", "--nope"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(matches!(parse_args(&argv), Err(CliError::Usage(_))));
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        let argv: Vec<String> = ["metromap-cli", "--format", "png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(matches!(parse_args(&argv), Err(CliError::Usage(_))));
    }

    #[test]
    fn format_accepts_aliases() {
        assert!(matches!("jpeg".parse(), Ok(OutputFormat::Jpeg)));
        assert!(matches!("PNG".parse(), Ok(OutputFormat::Png)));
        assert!("webp".parse::<OutputFormat>().is_err());
    }
}
