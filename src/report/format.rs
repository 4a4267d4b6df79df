//! Text rendering of records.
//!
//! A record is a single line: a brace-delimited object with double-quoted
//! keys in fixed order (`elapsed`, `cpu`, `disk`, `memory`, `swap`).

use std::fmt::Write;
use std::time::Duration;

use crate::config::NonFinite;
use crate::report::record::{CpuUsage, DiskUsage, MemoryUsage, Record, SwapUsage};
use crate::util::format_duration;

/// Renders a record as one line, without the trailing newline.
pub fn format_record(record: &Record, non_finite: NonFinite) -> String {
    let f = |v: f64, precision: usize| format_float(v, precision, non_finite);
    let mut out = String::with_capacity(256);

    let _ = write!(out, "{{ \"elapsed\": {}", record.elapsed_secs);

    if let Some(cpu) = &record.cpu {
        out.push_str(", ");
        write_cpu(&mut out, cpu, &f);
    }
    if let Some(disks) = &record.disk {
        out.push_str(", ");
        write_disks(&mut out, disks, &f);
    }
    if let Some(mem) = &record.memory {
        out.push_str(", ");
        write_memory(&mut out, mem, &f);
    }
    if let Some(swap) = &record.swap {
        out.push_str(", ");
        write_swap(&mut out, swap, &f);
    }

    out.push_str(" }");
    out
}

/// Comment block printed before the averaged record.
///
/// Starts with two newlines so the block is separated from the last regular
/// record by two blank lines.
pub fn format_total_header(elapsed: Duration) -> String {
    format!("\n\n// measured average over {}", format_duration(elapsed))
}

fn write_cpu(out: &mut String, cpu: &CpuUsage, f: &impl Fn(f64, usize) -> String) {
    let _ = write!(
        out,
        "\"cpu\": {{ \"busy_percent\": {}, \"system\": {}, \"user\": {}, \"nice\": {}, \"idle\": {} }}",
        f(cpu.busy_percent, 2),
        f(cpu.system, 3),
        f(cpu.user, 3),
        f(cpu.nice, 3),
        f(cpu.idle, 3),
    );
}

fn write_disks(out: &mut String, disks: &[(String, DiskUsage)], f: &impl Fn(f64, usize) -> String) {
    out.push_str("\"disk\": { ");
    for (i, (device, usage)) in disks.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(
            out,
            "\"{}\": {{ \"util\": {}, \"read\": {}, \"write\": {} }}",
            escape(device),
            f(usage.util, 3),
            f(usage.read, 3),
            f(usage.write, 3),
        );
    }
    out.push_str(" }");
}

fn write_memory(out: &mut String, mem: &MemoryUsage, f: &impl Fn(f64, usize) -> String) {
    let _ = write!(
        out,
        "\"memory\": {{ \"used_percent\": {}, \"total\": {}, \"used\": {}, \"free\": {}, \"shared\": {}, \"buffers\": {}, \"cached\": {}, \"available\": {} }}",
        f(mem.used_percent, 2),
        f(mem.total, 0),
        f(mem.used, 0),
        f(mem.free, 0),
        f(mem.shared, 0),
        f(mem.buffers, 0),
        f(mem.cached, 0),
        f(mem.available, 0),
    );
}

fn write_swap(out: &mut String, swap: &SwapUsage, f: &impl Fn(f64, usize) -> String) {
    let _ = write!(
        out,
        "\"swap\": {{ \"used_percent\": {}, \"total\": {}, \"used\": {}, \"free\": {} }}",
        f(swap.used_percent, 2),
        f(swap.total, 0),
        f(swap.used, 0),
        f(swap.free, 0),
    );
}

/// Fixed-precision float. Non-finite values follow `policy`.
fn format_float(v: f64, precision: usize, policy: NonFinite) -> String {
    if v.is_finite() {
        return format!("{:.*}", precision, v);
    }
    match policy {
        NonFinite::Null => "null".to_string(),
        NonFinite::Literal if v.is_nan() => "NaN".to_string(),
        NonFinite::Literal if v > 0.0 => "+Inf".to_string(),
        NonFinite::Literal => "-Inf".to_string(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}
