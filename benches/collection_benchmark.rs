//! Category/item collection benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use brush_manager::data::items::{BrushData, NewItem, TextureData};
use brush_manager::data::{AddonDataByMode, BrushItemCollection};
use brush_manager::ContextMode;

fn populated(cats: usize, items_per_cat: usize) -> AddonDataByMode {
    let mut data = AddonDataByMode::new(ContextMode::Sculpt);
    let mut textures = Vec::with_capacity(cats * items_per_cat);
    for c in 0..cats {
        let cat = data.texture_cats.add(&format!("tex {}", c), None);
        for i in 0..items_per_cat {
            let item = cat
                .items_mut()
                .add(NewItem::new(format!("t{}", i), TextureData::default()));
            textures.push(item.uuid().to_string());
        }
    }
    for c in 0..cats {
        let cat = data.brush_cats.add(&format!("brush {}", c), None);
        for i in 0..items_per_cat {
            cat.items_mut().add(NewItem::new(
                format!("b{}", i),
                BrushData {
                    texture_uuid: textures.get(i * 3 % textures.len().max(1)).cloned(),
                },
            ));
        }
    }
    data
}

fn benchmark_collection_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("Item Collection");

    for count in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("add", count), count, |b, &count| {
            b.iter(|| {
                let mut items = BrushItemCollection::new();
                for i in 0..count {
                    items.add(NewItem::new(format!("b{}", i), BrushData::default()));
                }
                items
            })
        });

        let mut items = BrushItemCollection::new();
        let uuids: Vec<String> = (0..*count)
            .map(|i| {
                items
                    .add(NewItem::new(format!("b{}", i), BrushData::default()))
                    .uuid()
                    .to_string()
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("lookup_by_uuid", count), &uuids, |b, uuids| {
            b.iter(|| uuids.iter().filter(|uuid| items.get(uuid.as_str()).is_some()).count())
        });
    }

    group.finish();
}

fn benchmark_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Addon Data");

    for (cats, items) in [(4, 25), (10, 100)].iter() {
        let label = format!("{}x{}", cats, items);

        group.bench_function(BenchmarkId::new("ensure_owners", &label), |b| {
            let mut data = populated(*cats, *items);
            b.iter(|| data.ensure_owners())
        });

        let data = populated(*cats, *items);
        group.bench_function(BenchmarkId::new("snapshot_encode", &label), |b| {
            b.iter(|| bincode::serialize(&data).map(|bytes| bytes.len()))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_collection_ops, benchmark_aggregate);
criterion_main!(benches);
