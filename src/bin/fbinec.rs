use std::io::{self, BufWriter, Write};
#[cfg(unix)]
use std::mem::ManuallyDrop;
#[cfg(unix)]
use std::os::unix::io::FromRawFd;
use std::process;

use binec_rs::binary::{self, BinecError, Input, Mode, Options, Parsed};
use binec_rs::common::io::{FileData, read_file, read_stdin};
use binec_rs::common::{io_error_msg, logging, signal, tool_name};

/// Output buffer size; encoded batches are written through it.
const OUT_BUF: usize = 256 * 1024;

fn main() {
    binec_rs::common::reset_sigpipe();

    let mut args = std::env::args_os();
    let argv0 = args
        .next()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fbinec".to_string());
    let prog = tool_name(&argv0).to_string();

    if let Err(e) = logging::init() {
        eprintln!("{}: {:#}", prog, e);
    }

    let opts = match binary::parse_args(args) {
        Ok(Parsed::Run(opts)) => opts,
        Ok(Parsed::Help) => {
            eprint!("{}", binary::usage(&prog));
            process::exit(0);
        }
        Ok(Parsed::Version) => {
            println!("binec (fbinec) {}", env!("CARGO_PKG_VERSION"));
            process::exit(0);
        }
        Err(e) => fail(&prog, e),
    };
    log::debug!("mode {:?}, input {:?}", opts.mode, opts.input);

    // Nothing is written until the whole input is in memory, so an
    // interrupted read leaves no partial output behind.
    signal::install();
    let data = match read_input(&opts.input) {
        Ok(data) => data,
        Err(e) => fail(&prog, e),
    };
    signal::restore_default();
    if signal::interrupted() {
        fail(&prog, BinecError::Interrupted);
    }
    log::debug!("read {} bytes", data.len());

    #[cfg(unix)]
    let stdout_raw = unsafe { ManuallyDrop::new(std::fs::File::from_raw_fd(1)) };
    #[cfg(unix)]
    let mut out = BufWriter::with_capacity(OUT_BUF, &*stdout_raw);
    #[cfg(not(unix))]
    let stdout = io::stdout();
    #[cfg(not(unix))]
    let mut out = BufWriter::with_capacity(OUT_BUF, stdout.lock());

    let result = convert(&data, &opts, &mut out).and_then(|()| out.flush());
    if let Err(e) = result {
        if e.kind() == io::ErrorKind::BrokenPipe {
            process::exit(0);
        }
        eprintln!("{}: write error: {}", prog, io_error_msg(&e));
        process::exit(1);
    }
}

fn read_input(input: &Input) -> Result<FileData, BinecError> {
    match input {
        Input::Stdin => read_stdin()
            .map(FileData::Owned)
            .map_err(|e| BinecError::from_read(None, e)),
        Input::File(path) => {
            read_file(path).map_err(|e| BinecError::from_read(Some(path.clone()), e))
        }
    }
}

fn convert(data: &[u8], opts: &Options, out: &mut impl Write) -> io::Result<()> {
    match opts.mode {
        Mode::Decode => binary::decode_to_writer(data, out),
        Mode::Encode => {
            binary::encode_to_writer(data, &opts.encode, out)?;
            // The encoder itself never ends the text; the tool terminates the
            // last line unless newlines are excluded.
            if opts.encode.newlines {
                out.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

fn fail(prog: &str, e: BinecError) -> ! {
    match &e {
        BinecError::Usage(reason) => {
            log::debug!("usage error: {}", reason);
            eprint!("{}", binary::usage(prog));
        }
        BinecError::Interrupted => {
            println!();
        }
        BinecError::Io { .. } => {
            eprintln!("{}: {}", prog, e);
        }
    }
    process::exit(e.exit_code());
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::process::{Command, Output, Stdio};

    fn cmd() -> Command {
        let mut path = std::env::current_exe().unwrap();
        path.pop();
        path.pop();
        path.push("fbinec");
        Command::new(path)
    }

    fn run(args: &[&str], input: &[u8]) -> Output {
        let mut child = cmd()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child.stdin.take().unwrap().write_all(input).unwrap();
        child.wait_with_output().unwrap()
    }

    #[test]
    fn test_encode_ends_with_newline() {
        let output = run(&[], b"AB");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"01000001 01000010\n");
    }

    #[test]
    fn test_encode_exclude_newlines_has_no_trailing_newline() {
        let output = run(&["-e", "--delim", ":"], b"AB");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"01000001:01000010");
    }

    #[test]
    fn test_encode_wraps_at_interval() {
        let output = run(&["-n", "2", "--delim", ","], b"abc");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"01100001,01100010,\n01100011\n");
    }

    #[test]
    fn test_encode_empty_input_prints_lone_newline() {
        let output = run(&[], b"");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"\n");

        let output = run(&["-e"], b"");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"");
    }

    #[test]
    fn test_decode_writes_raw_bytes() {
        let output = run(&["-d"], b"11111111 00000000\n1000000");
        assert!(output.status.success());
        assert_eq!(output.stdout, vec![0xff, 0x00, 0x80]);
    }

    #[test]
    fn test_encode_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\x00\x01").unwrap();
        let output = run(&[tmp.path().to_str().unwrap()], b"");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"00000000 00000001\n");
    }

    #[test]
    fn test_usage_error_exits_one() {
        let cases: [&[&str]; 4] = [&["--bogus"], &["-n", "0"], &["-d", "-d"], &["a", "b"]];
        for args in cases {
            let output = run(args, b"");
            assert_eq!(output.status.code(), Some(1), "{args:?}");
            assert!(output.stdout.is_empty(), "{args:?}");
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(stderr.starts_with("Usage: binec "), "{args:?}: {stderr}");
        }
    }

    #[test]
    fn test_help_exits_zero_on_stderr() {
        let output = run(&["-h"], b"");
        assert_eq!(output.status.code(), Some(0));
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).starts_with("Usage: binec "));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        let output = run(&[path.to_str().unwrap()], b"");
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        assert_eq!(
            String::from_utf8_lossy(&output.stderr),
            format!("binec: {}: No such file or directory\n", path.display())
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sigint_during_read_exits_two() {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("input");
        let c_path = CString::new(fifo.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) }, 0);

        // Opened read-write so neither side blocks in open(); the writer stays
        // open and silent, leaving the tool parked in read().
        let mut writer = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&fifo)
            .unwrap();
        writer.write_all(b"0100").unwrap();

        let child = cmd()
            .arg(&fifo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGINT) }, 0);

        let output = child.wait_with_output().unwrap();
        drop(writer);
        assert_eq!(output.status.code(), Some(2));
        assert_eq!(output.stdout, b"\n");
    }
}
