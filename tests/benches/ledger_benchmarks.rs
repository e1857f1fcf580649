//! # Flight Surety Ledger Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Policy purchase | < 100µs per policy |
//! | Oracle quorum round | < 1ms per flight |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{ether, milli_ether, Address, FlightKey, FlightStatus};
use std::time::Duration;
use surety_ledger::adapters::ScriptedEntropy;
use surety_ledger::{Ledger, LedgerConfig};

const OWNER: Address = Address::from_low_u8(1);
const AIRLINE: Address = Address::from_low_u8(2);

fn account(prefix: u8, n: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = prefix;
    bytes[16..].copy_from_slice(&n.to_be_bytes());
    Address(bytes)
}

fn ledger_with_flight() -> (Ledger<ScriptedEntropy>, FlightKey) {
    let mut ledger = Ledger::new(
        LedgerConfig::default(),
        ScriptedEntropy::constant(3),
        OWNER,
        AIRLINE,
    );
    ledger.pay_airline_dues(AIRLINE, ether(10)).expect("fund");
    let key = ledger
        .register_flight(AIRLINE, "ND1309", 1_700_000_000)
        .expect("flight")
        .output;
    (ledger, key)
}

fn bench_purchase(c: &mut Criterion) {
    let mut group = c.benchmark_group("insurance-purchase");
    group.measurement_time(Duration::from_secs(5));

    for size in [10u32, 100, 1_000] {
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("purchase_batch", size), &size, |b, &size| {
            b.iter_with_setup(ledger_with_flight, |(mut ledger, key)| {
                for n in 0..size {
                    let receipt = ledger
                        .purchase_insurance(account(0x50, n), key.clone(), milli_ether(100), milli_ether(100))
                        .expect("purchase");
                    black_box(receipt);
                }
            })
        });
    }
    group.finish();
}

fn bench_oracle_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle-quorum");

    for policies in [0u32, 100, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("finalize_and_credit", policies),
            &policies,
            |b, &policies| {
                b.iter_with_setup(
                    || {
                        let (mut ledger, key) = ledger_with_flight();
                        for n in 0..3 {
                            ledger.register_oracle(account(0x0a, n), ether(1)).expect("oracle");
                        }
                        for n in 0..policies {
                            ledger
                                .purchase_insurance(account(0x50, n), key.clone(), 1_000, 1_000)
                                .expect("purchase");
                        }
                        (ledger, key)
                    },
                    |(mut ledger, key)| {
                        let index = ledger
                            .fetch_flight_status(OWNER, key.clone())
                            .expect("request")
                            .output;
                        for n in 0..3 {
                            let receipt = ledger
                                .submit_oracle_response(
                                    account(0x0a, n),
                                    index,
                                    key.clone(),
                                    FlightStatus::LateAirline.code(),
                                )
                                .expect("response");
                            black_box(receipt);
                        }
                    },
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_purchase, bench_oracle_round);
criterion_main!(benches);
