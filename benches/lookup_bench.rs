//! Benchmarks for trie construction, lookups and stamp decoding.
//!
//! Simulates realistic blocklist sizes:
//! - small:  ~1k domains   (a single curated list)
//! - medium: ~20k domains  (a few stacked lists)
//! - large:  ~100k domains (aggregated multi-list deployment)
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blocktrie::{
    decode_blockstamp, encode_blockstamp, encode_tags, read_blob, reverse_key, write_blob,
    FrozenTrie, StampFormat, TagTable, TrieBuilder,
};

// ============================================================================
// CORPUS SIMULATION
// ============================================================================

struct CorpusSize {
    name: &'static str,
    domains: usize,
}

const CORPUS_SIZES: &[CorpusSize] = &[
    CorpusSize { name: "small", domains: 1_000 },
    CorpusSize { name: "medium", domains: 20_000 },
    CorpusSize { name: "large", domains: 100_000 },
];

const LABELS: &[&str] = &[
    "ads", "track", "metrics", "pixel", "beacon", "cdn", "static", "api", "app", "login",
    "telemetry", "stats", "counter", "banner", "click", "pop", "sync", "img", "tag", "log",
];

const TLDS: &[&str] = &["com", "net", "org", "io", "co", "info"];

const TAGS: &[&str] = &["ads", "tracking", "malware", "phishing", "gambling", "social"];

/// Deterministic pseudo-random domain corpus. No RNG dependency; a simple
/// multiplicative hash spreads the labels well enough for shape variety.
fn synth_domains(count: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let h = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let label = LABELS[(h & 0xFF) as usize % LABELS.len()];
        let tld = TLDS[((h >> 8) & 0xFF) as usize % TLDS.len()];
        let depth = ((h >> 16) & 0x03) as usize;
        let mut domain = format!("{}{}.host{}.{}", label, i % 97, h % 9973, tld);
        for d in 0..depth {
            domain = format!("sub{}.{}", d, domain);
        }
        out.push(domain);
    }
    out.sort_by_key(|d| reverse_key(d));
    out.dedup();
    out
}

fn build_trie(domains: &[String]) -> FrozenTrie {
    let table = TagTable::new(TAGS.iter().map(|s| (*s).to_string()).collect()).unwrap();
    let mut builder = TrieBuilder::new(table);
    for (i, domain) in domains.iter().enumerate() {
        let tags = [TAGS[i % TAGS.len()], TAGS[(i / 3) % TAGS.len()]];
        builder.insert(domain, &tags).unwrap();
    }
    builder.freeze().unwrap()
}

// ============================================================================
// BENCHMARKS
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in CORPUS_SIZES {
        let domains = synth_domains(size.domains);
        group.throughput(Throughput::Elements(domains.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size.name), &domains, |b, domains| {
            b.iter(|| build_trie(black_box(domains)));
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    for size in CORPUS_SIZES {
        let domains = synth_domains(size.domains);
        let trie = build_trie(&domains);

        // Hit: every 37th inserted domain, queried one level deeper.
        let hits: Vec<String> = domains
            .iter()
            .step_by(37)
            .map(|d| format!("deep.{}", d))
            .collect();
        group.bench_with_input(
            BenchmarkId::new("hit", size.name),
            &(&trie, &hits),
            |b, (trie, hits)| {
                b.iter(|| {
                    for domain in hits.iter() {
                        black_box(trie.lookup(black_box(domain)).unwrap());
                    }
                });
            },
        );

        // Miss: names sharing TLDs but never inserted.
        let misses: Vec<String> =
            (0..hits.len()).map(|i| format!("absent{}.example-miss.com", i)).collect();
        group.bench_with_input(
            BenchmarkId::new("miss", size.name),
            &(&trie, &misses),
            |b, (trie, misses)| {
                b.iter(|| {
                    for domain in misses.iter() {
                        black_box(trie.lookup(black_box(domain)).unwrap());
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_container(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");
    for size in CORPUS_SIZES {
        let domains = synth_domains(size.domains);
        let trie = build_trie(&domains);
        let blob = write_blob(&trie).unwrap();

        group.throughput(Throughput::Bytes(blob.len() as u64));
        group.bench_with_input(BenchmarkId::new("write", size.name), &trie, |b, trie| {
            b.iter(|| write_blob(black_box(trie)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("read", size.name), &blob, |b, blob| {
            b.iter(|| read_blob(black_box(blob)).unwrap());
        });
    }
    group.finish();
}

fn bench_stamp(c: &mut Criterion) {
    let table = TagTable::new(TAGS.iter().map(|s| (*s).to_string()).collect()).unwrap();
    let bitmap = encode_tags(&table, &["ads", "malware", "social"]).unwrap();
    let b64 = encode_blockstamp(&bitmap, StampFormat::Base64Url);
    let b32 = encode_blockstamp(&bitmap, StampFormat::Base32);

    let mut group = c.benchmark_group("stamp");
    group.bench_function("encode_base64", |b| {
        b.iter(|| encode_blockstamp(black_box(&bitmap), StampFormat::Base64Url));
    });
    group.bench_function("decode_base64", |b| {
        b.iter(|| decode_blockstamp(black_box(&b64)).unwrap());
    });
    group.bench_function("decode_base32", |b| {
        b.iter(|| decode_blockstamp(black_box(&b32)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup, bench_container, bench_stamp);
criterion_main!(benches);
