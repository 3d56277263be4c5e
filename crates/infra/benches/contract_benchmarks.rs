use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use eggtrack_auth::{Identity, Role};
use eggtrack_events::InMemoryEventBus;
use eggtrack_infra::{ContractConfig, EggTrackingContract, InMemoryWorldState};
use eggtrack_shipments::ShipmentRequest;

type Contract = EggTrackingContract<InMemoryWorldState, InMemoryEventBus>;

fn setup() -> Contract {
    EggTrackingContract::new(
        InMemoryWorldState::new(),
        InMemoryEventBus::new(),
        ContractConfig::default(),
    )
}

fn farmer(id: &str) -> Identity {
    Identity::new(id).with_role(Role::Farmer)
}

fn shipper(id: &str) -> Identity {
    Identity::new(id).with_role(Role::Shipper)
}

/// Ledger with `boxes` packed boxes spread over ten farmers.
fn seeded(boxes: usize) -> Contract {
    let contract = setup();
    for i in 0..boxes {
        let origin = format!("farmer{}", i % 10);
        contract
            .pack_eggs(&farmer(&origin), &origin, &format!("{i:08}"), 30)
            .unwrap();
    }
    contract
}

fn request(farmer_id: &str, creation: String, max: usize) -> ShipmentRequest {
    ShipmentRequest {
        farmer_id: farmer_id.to_string(),
        shipper_id: "shipper1".to_string(),
        distributor_id: "dist1".to_string(),
        shipment_creation: creation,
        min: 1,
        max,
    }
}

fn bench_pack_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_latency");

    group.bench_function("pack_fresh_box", |b| {
        let contract = setup();
        let caller = farmer("farmer1");
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            contract
                .pack_eggs(&caller, "farmer1", &n.to_string(), black_box(30))
                .unwrap();
        });
    });

    group.bench_function("pack_duplicate_rejected", |b| {
        let contract = seeded(1);
        let caller = farmer("farmer0");
        b.iter(|| {
            let _ = black_box(contract.pack_eggs(&caller, "farmer0", "00000000", 30));
        });
    });

    group.finish();
}

fn bench_shipment_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shipment_lifecycle");

    for batch in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*batch as u64));
        group.bench_with_input(
            BenchmarkId::new("create_load_deliver", batch),
            batch,
            |b, &size| {
                b.iter_batched(
                    || {
                        let contract = setup();
                        for i in 0..size {
                            contract
                                .pack_eggs(&farmer("farmer1"), "farmer1", &format!("{i:06}"), 30)
                                .unwrap();
                        }
                        contract
                    },
                    |contract| {
                        let request = request("farmer1", "t0".to_string(), 0);
                        let shipment =
                            contract.create_shipment(&farmer("farmer1"), &request).unwrap();
                        let id = shipment.shipment_id().as_str();
                        contract.load_boxes(&shipper("shipper1"), id, "t1").unwrap();
                        contract.deliver_boxes(&shipper("shipper1"), id, "t2").unwrap();
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_selector_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_scan");

    for size in [100usize, 1_000, 10_000].iter() {
        let contract = seeded(*size);
        let caller = farmer("farmer3");
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("query_eggs", size), size, |b, _| {
            b.iter(|| black_box(contract.query_eggs(&caller, "farmer3").unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("query_packed_eggs_capped", size), size, |b, _| {
            b.iter(|| black_box(contract.query_packed_eggs(&caller, "farmer3", 50).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pack_latency,
    bench_shipment_lifecycle,
    bench_selector_scan
);
criterion_main!(benches);
