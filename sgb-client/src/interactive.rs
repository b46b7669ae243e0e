//! Line-based prompt used when the client starts without arguments

use crate::input::{parse_subnet, RawInputs};
use sgb_core::ClientSettings;
use std::io::{self, BufRead, Write};

/// Ask for port, target and message, falling back to the settings defaults
///
/// A target that is a broadcastable template (`x.y.z.0`) is treated as a subnet,
/// anything else as a single IP address.
pub fn prompt_inputs<R, W>(
    input: &mut R,
    output: &mut W,
    defaults: &ClientSettings,
) -> io::Result<RawInputs>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "SGB Client - Interactive Mode")?;
    writeln!(output, "-----------------------------")?;

    let port = ask(input, output, "Port", Some(&defaults.default_port.to_string()))?;
    let target = ask(input, output, "Subnet or IP", Some(&defaults.default_subnet))?;
    let message = ask(input, output, "Message", None)?;

    let (subnet, ip) = if parse_subnet(&target).is_ok() {
        (Some(target), None)
    } else {
        (None, Some(target))
    };

    Ok(RawInputs {
        port,
        subnet,
        ip,
        message,
    })
}

fn ask<R, W>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: Option<&str>,
) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    match default {
        Some(d) => write!(output, "{label} [{d}]: ")?,
        None => write!(output, "{label}: ")?,
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();

    Ok(match default {
        Some(d) if answer.is_empty() => d.to_string(),
        _ => answer.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_defaults_fill_empty_answers() {
        let mut input = Cursor::new("\n\nrestart\n");
        let mut output = Vec::new();

        let raw = prompt_inputs(&mut input, &mut output, &ClientSettings::default()).unwrap();

        assert_eq!(raw.port, "62300");
        assert_eq!(raw.subnet.as_deref(), Some("192.168.1.0"));
        assert_eq!(raw.ip, None);
        assert_eq!(raw.message, "restart");

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Port [62300]: "));
    }

    #[test]
    fn test_host_address_becomes_single_target() {
        let mut input = Cursor::new("9000\n192.168.1.20\nhello\n");
        let mut output = Vec::new();

        let raw = prompt_inputs(&mut input, &mut output, &ClientSettings::default()).unwrap();

        assert_eq!(raw.port, "9000");
        assert_eq!(raw.subnet, None);
        assert_eq!(raw.ip.as_deref(), Some("192.168.1.20"));
    }

    #[test]
    fn test_closed_input_leaves_message_empty() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let raw = prompt_inputs(&mut input, &mut output, &ClientSettings::default()).unwrap();
        assert!(raw.message.is_empty());
        assert!(raw.validate().is_err());
    }
}
