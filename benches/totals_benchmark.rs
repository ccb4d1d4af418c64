use criterion::{black_box, criterion_group, criterion_main, Criterion};
use landscape_pro::models::proposal::{
    calculate_section_total, calculate_totals, ItemCategory, ProposalItem, ProposalSection,
};

fn build_sections(section_count: usize, items_per_section: usize) -> Vec<ProposalSection> {
    (0..section_count)
        .map(|s| {
            let items: Vec<ProposalItem> = (0..items_per_section)
                .map(|i| ProposalItem {
                    id: format!("item-{}-{}", s, i),
                    name: format!("Item {}", i),
                    description: "Work item".to_string(),
                    quantity: (i % 7 + 1) as f64,
                    unit: "hours".to_string(),
                    unit_price: 42.5 + i as f64,
                    total_price: ((i % 7 + 1) as f64) * (42.5 + i as f64),
                    category: ItemCategory::Labor,
                })
                .collect();
            let subtotal = calculate_section_total(&items);
            ProposalSection {
                id: format!("section-{}", s),
                title: format!("Section {}", s),
                description: None,
                items,
                subtotal,
            }
        })
        .collect()
}

fn benchmark_totals(c: &mut Criterion) {
    let small = build_sections(3, 10);
    let large = build_sections(50, 200);

    let mut group = c.benchmark_group("proposal_totals");

    group.bench_function("small_proposal", |b| {
        b.iter(|| calculate_totals(black_box(&small), black_box(8.5)))
    });

    group.bench_function("large_proposal", |b| {
        b.iter(|| calculate_totals(black_box(&large), black_box(8.5)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_totals);
criterion_main!(benches);
