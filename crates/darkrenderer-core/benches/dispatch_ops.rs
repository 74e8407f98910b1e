use darkrenderer_core::Partitioner;
use darkrenderer_core::queue::QueueFabric;
use darkrenderer_core::tracer::Tracer;
use darkrenderer_core::tracer::cpu::CpuTracer;
use darkrenderer_protocol::{MollerTrumbore, Scene};
use divan::Bencher;
use divan::counter::ItemsCount;

fn main() {
    divan::main();
}

fn rays(num_rays: usize) -> Vec<f64> {
    (0..num_rays)
        .flat_map(|i| vec![0.0, 0.0, -5.0 - i as f64, 0.0, 0.0, 1.0])
        .collect()
}

fn scene() -> Scene {
    Scene {
        triangle_ids: vec![0],
        triangles: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
        camera: None,
    }
}

mod partition {
    use super::*;

    #[divan::bench(args = [64, 1024, 65536])]
    fn partition_rays(bencher: Bencher, num_rays: usize) {
        let buffer = rays(num_rays);
        bencher
            .counter(ItemsCount::new(num_rays))
            .bench(|| Partitioner::new().partition(&buffer, 256));
    }
}

mod queue_fabric {
    use super::*;
    use darkrenderer_protocol::Task;

    #[divan::bench(args = [false, true])]
    fn fill_and_drain(bencher: Bencher, multiqueue: bool) {
        bencher
            .counter(ItemsCount::new(1000usize))
            .bench(|| {
                let fabric = QueueFabric::new(4, multiqueue);
                let tasks = (0..1000).map(|id| Task::new(id, vec![0.0; 6]));
                fabric.fill(tasks, 4);

                let mut total = 0;
                for primary in 0..4 {
                    let mut handle = fabric.handle_for(primary);
                    while handle.get_task(true).is_some() {
                        total += 1;
                    }
                }
                total
            });
    }
}

mod cpu_tracer {
    use super::*;

    #[divan::bench(args = [8, 128, 1024])]
    fn compute(bencher: Bencher, num_rays: usize) {
        let mut tracer = CpuTracer::new(MollerTrumbore, false);
        tracer.set_scene(&scene());
        let buffer = rays(num_rays);

        bencher
            .counter(ItemsCount::new(num_rays))
            .bench(|| tracer.compute(&buffer));
    }
}
