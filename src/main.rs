use clap::{arg, crate_version, Command};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help =
"Examples:
---------
Compress:      `epscompress -i figure.eps -o figure.compressed.eps`";

    let main_cmd = Command::new("epscompress")
        .about("Compress the body of an EPS file with an inline ASCII85/LZW PostScript filter")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(-i --input <PATH> "input EPS file").required(true))
        .arg(arg!(-o --output <PATH> "output EPS file").required(true));

    let matches = main_cmd.get_matches();

    let path_in = matches.get_one::<String>("input").expect(RCH);
    let path_out = matches.get_one::<String>("output").expect(RCH);

    let (read, written) = epscompress::compress_file(path_in, path_out)?;
    log::info!("read {} bytes, wrote {} bytes", read, written);

    Ok(())
}
