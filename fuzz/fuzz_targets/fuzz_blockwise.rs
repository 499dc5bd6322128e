#![no_main]

use blocksa::{BlockwiseSa, BuilderConfig, ByteText};
use libfuzzer_sys::fuzz_target;
use std::cmp::Ordering;

fuzz_target!(|data: &[u8]| {
    // First bytes pick the parameters, the rest is the text
    if data.len() < 3 {
        return;
    }
    let bucket = (data[0] as u32 % 64) + 2;
    let dc = match data[1] % 4 {
        0 => 0,
        1 => 4,
        2 => 8,
        _ => 16,
    };
    let seed = data[2] as u64;
    let text = &data[3..data.len().min(512)];

    let t = ByteText::new(text);
    let mut sa = BlockwiseSa::new(
        &t,
        BuilderConfig {
            bucket_size: bucket,
            dc_period: dc,
            seed,
            sanity_check: true,
            verbose: false,
        },
    )
    .unwrap();

    let mut got = Vec::with_capacity(text.len() + 1);
    while sa.has_more_suffixes().unwrap() {
        got.push(sa.next_suffix().unwrap());
    }

    // the stream must be the reference suffix array under the
    // fall-off-is-greater convention
    let mut want: Vec<u32> = (0..=text.len() as u32).collect();
    want.sort_by(|&a, &b| {
        let (sa_, sb) = (&text[a as usize..], &text[b as usize..]);
        let m = sa_.len().min(sb.len());
        match sa_[..m].cmp(&sb[..m]) {
            Ordering::Equal => sb.len().cmp(&sa_.len()),
            ord => ord,
        }
    });
    assert_eq!(got, want);
});
