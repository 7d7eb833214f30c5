/// End-to-end recovery over synthetic binary logs
mod common;

use std::io::Cursor;

use chatlog_recovery::decoder::{Decoded, RecordDecoder};
use chatlog_recovery::{RecordKind, RecoveryOptions, Session, Statistics, Step};
use chrono::NaiveDate;
use common::{
    BASE_TIMESTAMP, LogBuilder, RecordBuilder, recover_bytes, reference_time, test_options,
};

fn options_with(phrase: &str, use_pattern: bool, retain_damaged: bool) -> RecoveryOptions {
    RecoveryOptions::new(None, None, phrase, use_pattern, retain_damaged)
        .unwrap()
        .with_reference_time(reference_time())
}

#[test]
fn test_well_formed_record_followed_by_next_record() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).name("Bob").body("Hey"))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("[2001-09-09 01:46:40] Alice: Hi!"));
    assert_eq!(lines.next(), Some("[2001-09-09 01:48:20] Bob: Hey"));
    assert_eq!(lines.next(), None);
    assert!(stats.gap_bytes.is_zero());
    assert_eq!(stats.intact_records, 2);
    assert_eq!(stats.emitted_records, 2);
}

#[test]
fn test_body_longer_than_source_is_truncated() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body("Hello").declared_body_len(40))
        .build();
    let available = log.len() as f64;

    let (output, stats) = recover_bytes(log, &options_with("", false, true));

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: Hello [TRUNCATED MESSAGE]\n");
    assert_eq!(stats.truncated_records, 1);
    assert_eq!(stats.truncated_bytes.as_bytes_f64(), available);
    assert_eq!(stats.intact_records, 0);
}

#[test]
fn test_truncated_record_dropped_by_default() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body("Hello").declared_body_len(40))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert!(output.is_empty());
    assert_eq!(stats.truncated_records, 1);
    assert_eq!(stats.emitted_records, 0);
}

#[test]
fn test_junk_between_records_is_annotated() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .junk(50)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).name("Bob").body("Back"))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert_eq!(
        output,
        "[2001-09-09 01:46:40] Alice: Hi!\n(50 missing bytes)\n[2001-09-09 01:48:20] Bob: Back\n"
    );
    assert_eq!(stats.gap_bytes.as_bytes_f64(), 50.0);
    assert_eq!(stats.intact_records, 2);
}

#[test]
fn test_large_gap_uses_grouped_digits() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .junk(1_500)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert!(output.contains("\n(1,500 missing bytes)\n"));
    assert_eq!(stats.gap_bytes.as_bytes_f64(), 1_500.0);
}

#[test]
fn test_leading_junk_is_reported_before_first_record() {
    let log = LogBuilder::new()
        .junk(12)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert_eq!(output, "(12 missing bytes)\n[2001-09-09 01:48:20] Alice: Hi!\n");
    assert_eq!(stats.gap_bytes.as_bytes_f64(), 12.0);
}

#[test]
fn test_phrase_filter_is_case_insensitive() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body("Hello world"))
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).body("goodbye"))
        .build();

    let (output, stats) = recover_bytes(log, &options_with("hello", false, false));

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: Hello world\n");
    assert_eq!(stats.intact_records, 2);
    assert_eq!(stats.discarded_records, 1);
    assert_eq!(stats.emitted_records, 1);
    assert_eq!(
        stats.emitted_bytes().as_bytes_f64(),
        stats.intact_bytes.as_bytes_f64() - stats.discarded_bytes.as_bytes_f64()
    );
}

#[test]
fn test_phrase_matches_speaker_name() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().name("Hellboy").body("grr"))
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).body("nothing here"))
        .build();

    let (output, _) = recover_bytes(log, &options_with("HELL", false, false));

    assert_eq!(output, "[2001-09-09 01:46:40] Hellboy: grr\n");
}

#[test]
fn test_regex_phrase_filter() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body("rolled 17"))
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).body("rolled a die"))
        .build();

    let (output, _) = recover_bytes(log, &options_with(r"ROLLED \d+", true, false));

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: rolled 17\n");
}

#[test]
fn test_invalid_regex_is_rejected() {
    let err = RecoveryOptions::new(None, None, "(unclosed", true, false).unwrap_err();
    assert!(err.to_string().contains("invalid phrase pattern"));
}

#[test]
fn test_date_range_is_inclusive_and_order_independent() {
    let day = NaiveDate::from_ymd_opt(2001, 9, 9).unwrap();
    let next_day_ts = BASE_TIMESTAMP + 86_400;
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body("on the day"))
        .record(RecordBuilder::new().timestamp(next_day_ts).body("next day"))
        .build();

    let later = NaiveDate::from_ymd_opt(2001, 8, 1).unwrap();
    let options = RecoveryOptions::new(Some(day), Some(later), "", false, false)
        .unwrap()
        .with_reference_time(reference_time());
    let (output, stats) = recover_bytes(log, &options);

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: on the day\n");
    assert_eq!(stats.discarded_records, 1);
}

#[test]
fn test_gap_is_carried_past_discarded_records() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body("keep one"))
        .junk(20)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).body("skip"))
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 200).body("keep two"))
        .build();

    let (output, _) = recover_bytes(log, &options_with("keep", false, false));

    assert_eq!(
        output,
        "[2001-09-09 01:46:40] Alice: keep one\n(20 missing bytes)\n[2001-09-09 01:50:00] Alice: keep two\n"
    );
}

#[test]
fn test_kind_specific_rendering() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().kind(RecordKind::Me).body("waves"))
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 1).kind(RecordKind::Ad).body("Buy"))
        .record(
            RecordBuilder::new()
                .timestamp(BASE_TIMESTAMP + 2)
                .kind(RecordKind::Headless)
                .body("Server restarting"),
        )
        .record(
            RecordBuilder::new()
                .timestamp(BASE_TIMESTAMP + 3)
                .kind(RecordKind::Warning)
                .name("Mod")
                .body("Calm down"),
        )
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "[2001-09-09 01:46:40] Alice waves",
            "[2001-09-09 01:46:41] Alice (ad): Buy",
            "[2001-09-09 01:46:42] Server restarting",
            "[2001-09-09 01:46:43] Mod (warning): Calm down",
        ]
    );
    assert!(stats.gap_bytes.is_zero());
}

#[test]
fn test_end_marker_is_consumed_without_output() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .end_marker(BASE_TIMESTAMP + 10)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).body("after"))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert_eq!(
        output,
        "[2001-09-09 01:46:40] Alice: Hi!\n[2001-09-09 01:48:20] Alice: after\n"
    );
    assert!(stats.gap_bytes.is_zero());
}

#[test]
fn test_future_timestamp_is_corrupt() {
    let log = LogBuilder::new().record(RecordBuilder::new().timestamp(2_100_000_000)).build();

    let (dropped, stats) = recover_bytes(log.clone(), &test_options());
    assert!(dropped.is_empty());
    assert_eq!(stats.corrupt_timestamp_records, 1);

    let (kept, _) = recover_bytes(log, &options_with("", false, true));
    assert_eq!(kept, "[CORRUPT TIMESTAMP] Alice: Hi!\n");
}

#[test]
fn test_backwards_timestamp_is_corrupt() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).body("first"))
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP).body("earlier"))
        .build();

    let (output, stats) = recover_bytes(log, &options_with("", false, true));

    assert_eq!(
        output,
        "[2001-09-09 01:48:20] Alice: first\n[CORRUPT TIMESTAMP] Alice: earlier\n"
    );
    assert_eq!(stats.corrupt_timestamp_records, 1);
    assert_eq!(stats.intact_records, 1);
}

#[test]
fn test_empty_body_is_marked() {
    let log = LogBuilder::new().record(RecordBuilder::new().body("")).build();

    let (output, stats) = recover_bytes(log, &options_with("", false, true));

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: [EMPTY MESSAGE]\n");
    assert_eq!(stats.empty_records, 1);
}

#[test]
fn test_non_printable_body_bytes_are_stripped() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new().body_bytes(b"a\x07b\x1bc\td"))
        .build();

    let (output, _) = recover_bytes(log, &test_options());

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: abc\td\n");
}

#[test]
fn test_decoding_is_deterministic() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .junk(33)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).declared_body_len(900))
        .build();

    let first = recover_bytes(log.clone(), &options_with("", false, true));
    let second = recover_bytes(log, &options_with("", false, true));

    assert_eq!(first, second);
}

#[test]
fn test_session_steps_report_consumed_bytes() {
    let first = RecordBuilder::new();
    let second = RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100);
    let first_len = first.to_bytes().len() as u64;
    let log = LogBuilder::new().record(first).junk(7).record(second).build();
    let total = log.len() as u64;

    let mut session = Session::open(Cursor::new(log), Vec::new(), &test_options());
    let mut consumed = Vec::new();
    loop {
        match session.step().unwrap() {
            Step::Record(report) => consumed.push(report.bytes_consumed),
            Step::Skipped { bytes_consumed } => consumed.push(bytes_consumed),
            Step::EndOfStream => break,
        }
    }

    assert_eq!(consumed[0], first_len + 7);
    assert_eq!(consumed.iter().sum::<u64>(), total);
    assert_eq!(session.position(), total);
}

#[test]
fn test_decoder_isolated_per_session() {
    let late = LogBuilder::new().record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 500)).build();
    let early = LogBuilder::new().record(RecordBuilder::new()).build();

    let (_, late_stats) = recover_bytes(late, &test_options());
    let (output, early_stats) = recover_bytes(early, &test_options());

    assert_eq!(late_stats.corrupt_timestamp_records, 0);
    assert_eq!(early_stats.corrupt_timestamp_records, 0);
    assert_eq!(output, "[2001-09-09 01:46:40] Alice: Hi!\n");
}

#[test]
fn test_unknown_kind_at_start_is_unreadable() {
    let log = LogBuilder::new()
        .raw(&[0x3B, 0x9A, 0xCA, 0x10, 0x42])
        .junk(10)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100))
        .build();

    let mut decoder = RecordDecoder::new(Cursor::new(log), reference_time());
    let mut stats = Statistics::new();

    let first = decoder.next_record(&mut stats).unwrap();
    assert_eq!(first, Decoded::Unreadable { bytes: 5, kind_byte: Some(0x42) });
    assert_eq!(decoder.pending_gap(), 15);
    assert!(matches!(decoder.next_record(&mut stats).unwrap(), Decoded::Record(_)));
    assert_eq!(decoder.next_record(&mut stats).unwrap(), Decoded::EndOfStream);
    assert_eq!(stats.gap_bytes.as_bytes_f64(), 15.0);
}

#[test]
fn test_unknown_kind_after_record_is_absorbed_into_gap() {
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .raw(&[0x3B, 0x9A, 0xCA, 0x10, 0x42])
        .junk(10)
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert_eq!(
        output,
        "[2001-09-09 01:46:40] Alice: Hi!\n(15 missing bytes)\n[2001-09-09 01:48:20] Alice: Hi!\n"
    );
    assert_eq!(stats.gap_bytes.as_bytes_f64(), 15.0);
    assert_eq!(stats.intact_records, 2);
}

#[test]
fn test_junk_holding_a_kind_byte_can_swallow_next_record() {
    // "xyzw" reads as a future timestamp and 0x00 as a Regular kind, so the
    // scan stops right after the first record and the false header's name
    // length (0x3B) runs over the whole next record.
    let log = LogBuilder::new()
        .record(RecordBuilder::new())
        .raw(b"xyzw\x00")
        .record(RecordBuilder::new().timestamp(BASE_TIMESTAMP + 100).name("Bob"))
        .build();

    let (output, stats) = recover_bytes(log, &test_options());

    assert_eq!(output, "[2001-09-09 01:46:40] Alice: Hi!\n");
    assert!(stats.gap_bytes.is_zero());
    assert_eq!(stats.intact_records, 1);
    assert_eq!(stats.truncated_records, 1);
    assert_eq!(stats.corrupt_timestamp_records, 1);
    assert_eq!(stats.truncated_bytes.as_bytes_f64(), 5.0 + 14.0);
}
