mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::debug;

use cli::Cli;
use searchfs::sink::{write_results, write_volume_list};
use searchfs::{SearchfsError, SystemVolumes, EXIT_USAGE};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => exit_code(EXIT_USAGE),
            };
        }
    };

    setup_logging(&cli);
    debug!("invoked with {cli:?}");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("searchfs: {e}");
            exit_code(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), SearchfsError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list {
        let volumes = searchfs::list_volumes(&SystemVolumes)?;
        return finish_output(write_volume_list(&volumes, &mut out));
    }

    let mut builder = searchfs::search()
        .term(cli.term.clone().unwrap_or_default())
        .exact(cli.exact_match)
        .case_sensitive(cli.case_sensitive)
        .negate(cli.negate)
        .directories_only(cli.dirs_only)
        .files_only(cli.files_only)
        .skip_packages(cli.skip_packages)
        .skip_hidden(cli.skip_invisibles)
        .skip_system(cli.skip_inappropriate);
    if let Some(limit) = cli.limit {
        builder = builder.limit(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    if let Some(volume) = &cli.volume {
        builder = builder.volume(volume.clone());
    }

    let mut stream = builder.run()?;
    let written = write_results(&mut stream, &mut out, &mut io::stderr());
    drop(out);

    let stats = stream.stats();
    debug!(
        "scanned {} entries in {:.3}s ({} entries/s, {} volumes done)",
        stats.entries,
        stats.duration.as_secs_f64(),
        stats.entries_per_sec,
        stats.volumes_completed
    );
    finish_output(written.map(|summary| {
        debug!(
            "wrote {} results, {} volume(s) failed",
            summary.written, summary.failed_volumes
        );
    }))
}

/// A reader that closed the pipe early is not an error.
fn finish_output(result: io::Result<()>) -> Result<(), SearchfsError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(source) => Err(SearchfsError::Io {
            path: "<stdout>".into(),
            source,
        }),
    }
}

fn setup_logging(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] {}",
            record.level(),
            record.module_path().unwrap_or("searchfs"),
            record.args()
        )
    });
    builder.target(Target::Stderr);

    let _ = builder.try_init();
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
