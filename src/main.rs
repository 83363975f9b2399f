use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use msgpack_log_encoder::{
    ArrayMarshalerFn, Encoder, EncoderConfig, Entry, EntryCaller, Field, Level,
    ObjectMarshalerFn,
};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const RECORDS_FILE: &str = "records.msgpack";

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Opens `dir/records.msgpack` for appending, creating `dir` if needed.
fn open_output(dir: &Path) -> io::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(RECORDS_FILE)
        .build(dir)
        .map_err(io::Error::other)
}

/// Encodes sample entries and appends them to `OUTPUT_DIR/records.msgpack`.
///
/// Usage: `msgpack_log_encoder [OUTPUT_DIR] [COUNT]`
fn main() -> io::Result<()> {
    setup_logging();

    let mut args = env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| ".".to_string());
    let count = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10);

    let mut out = open_output(Path::new(&dir))?;
    let enc = Encoder::new(EncoderConfig::production())
        .with_fields(&[Field::string("service", "demo"), Field::u32("pid", std::process::id())]);

    let mut bytes = 0;
    for i in 0..count {
        let entry = Entry::new(Level::Info, "request served")
            .with_logger_name("demo.http")
            .with_caller(EntryCaller::here());
        let fields = [
            Field::usize("seq", i),
            Field::duration("latency", Duration::from_micros(250 + i as u64)),
            Field::slice("tags", vec!["edge", "cached"]),
            Field::object(
                "client",
                ObjectMarshalerFn::new(|obj| {
                    obj.add_string("ip", "10.0.0.7");
                    obj.add_bool("tls", true);
                    Ok(())
                }),
            ),
            Field::array(
                "retries",
                ArrayMarshalerFn::new(|arr| {
                    arr.append_u8(0);
                    Ok(())
                }),
            ),
        ];

        let record = enc.encode_entry(&entry, &fields);
        out.write_all(&record)?;
        bytes += record.len();
    }
    out.flush()?;

    info!(records = count, bytes, path = %format!("{dir}/{RECORDS_FILE}"), "wrote records");
    Ok(())
}
