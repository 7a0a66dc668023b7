//! FTP reply text extraction

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use log::debug;
use regex::Regex;

use super::ResponseCode;
use crate::error::{FtpClientError, Result};

static PATH_MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[0-9]{3}[ -]"((?:[^"]|"")+)""#).expect("path pattern is valid")
});

static ADDR_MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([0-9]{1,3}),([0-9]{1,3}),([0-9]{1,3}),([0-9]{1,3}),([0-9]{1,3}),([0-9]{1,3})\)")
        .expect("address pattern is valid")
});

/// A complete server reply
#[derive(Debug, Clone, PartialEq)]
pub struct FtpResponse {
    /// Reply code (e.g., 230, 530, 331)
    code: ResponseCode,

    /// The whole reply as received, including every CR LF
    raw: Vec<u8>,
}

impl FtpResponse {
    pub fn new(code: ResponseCode, raw: Vec<u8>) -> Self {
        Self { code, raw }
    }

    pub fn code(&self) -> ResponseCode {
        self.code
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn is_multi_line(&self) -> bool {
        self.raw.get(3) == Some(&b'-')
    }

    /// The reply text without reply codes and without the final CR LF.
    ///
    /// For a multi-line reply the code prefix of the last line is removed as
    /// well; the embedded line breaks are kept.
    pub fn message(&self) -> String {
        let text = String::from_utf8_lossy(&self.raw);
        let body = text.get(4..).unwrap_or("");
        let body = body.strip_suffix("\r\n").unwrap_or(body);
        if !self.is_multi_line() {
            return body.to_string();
        }

        let end_prefix = format!("{} ", self.code);
        match body.rfind("\r\n") {
            Some(pos) => {
                let (head, last) = body.split_at(pos + 2);
                let last = last.strip_prefix(end_prefix.as_str()).unwrap_or(last);
                format!("{head}{last}")
            }
            None => body.to_string(),
        }
    }

    /// Extract the quoted pathname of a 257 reply
    pub fn quoted_path(&self) -> Result<String> {
        let text = String::from_utf8_lossy(&self.raw);
        let captures = PATH_MATCHER
            .captures(&text)
            .ok_or_else(|| FtpClientError::protocol("path extraction", &self.raw))?;
        Ok(captures[1].replace("\"\"", "\""))
    }

    /// Parse the `(h1,h2,h3,h4,p1,p2)` data address of a 227 reply
    pub fn passive_address(&self) -> Result<SocketAddrV4> {
        let text = String::from_utf8_lossy(&self.raw);
        let parse_error = || FtpClientError::AddressParse(text.trim_end().to_string());

        let captures = ADDR_MATCHER.captures(&text).ok_or_else(parse_error)?;
        let mut fields = [0u8; 6];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = captures[i + 1].parse().map_err(|_| parse_error())?;
        }

        let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
        let port = (u16::from(fields[4]) << 8) + u16::from(fields[5]);
        debug!("Parsed passive address: {ip}:{port}");
        Ok(SocketAddrV4::new(ip, port))
    }

    /// Parse the byte count of a 213 reply to SIZE
    pub fn file_size(&self) -> Result<u64> {
        self.message()
            .trim()
            .parse()
            .map_err(|_| FtpClientError::protocol("SIZE", &self.raw))
    }

    /// Parse the `YYYYMMDDHHMMSS[.sss]` timestamp of a 213 reply to MDTM
    pub fn modification_time(&self) -> Result<DateTime<Utc>> {
        let message = self.message();
        let invalid = || FtpClientError::protocol("MDTM", &self.raw);

        let value = message.trim();
        let (main, fraction) = match value.split_once('.') {
            Some((main, fraction)) => (main, Some(fraction)),
            None => (value, None),
        };

        let mut time = NaiveDateTime::parse_from_str(main, "%Y%m%d%H%M%S").map_err(|_| invalid())?;
        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let digits: String = fraction.chars().chain("000000000".chars()).take(9).collect();
            let nanos: u32 = digits.parse().map_err(|_| invalid())?;
            time = time.with_nanosecond(nanos).ok_or_else(invalid)?;
        }

        Ok(time.and_utc())
    }
}

impl std::fmt::Display for FtpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(String::from_utf8_lossy(&self.raw).trim_end())
    }
}

/// Split NLST data into names, dropping the empty entry after the last line break
pub fn parse_name_list(data: &str) -> Vec<String> {
    let normalized = data.replace("\r\n", "\n");
    let mut names: Vec<String> = normalized.split('\n').map(str::to_string).collect();
    if names.last().is_some_and(String::is_empty) {
        names.pop();
    }
    names
}
