//! The audio path must never touch the heap once set up.
//!
//! Kept in its own test binary with a counting allocator. Counting is per
//! thread, so harness threads and parallel tests don't interfere.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use saavy_tremolo::{LfoWaveform, ShaperWaveform, TremoloLfo};
#[cfg(feature = "rtrb")]
use saavy_tremolo::{Transport, TremoloEngine, TremoloParams};

struct CountingAllocator;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static COUNTING: Cell<bool> = const { Cell::new(false) };
}

fn note_allocation() {
    if COUNTING.with(|counting| counting.get()) {
        ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
    }
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        note_allocation();
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        note_allocation();
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        note_allocation();
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Run `f` and return how many allocations it made on this thread.
fn allocations_during(f: impl FnOnce()) -> usize {
    let before = ALLOCATIONS.load(Ordering::SeqCst);
    COUNTING.with(|counting| counting.set(true));
    f();
    COUNTING.with(|counting| counting.set(false));
    ALLOCATIONS.load(Ordering::SeqCst) - before
}

#[test]
fn lfo_does_not_allocate() {
    // walk every state, retune and reshape between samples
    let mut lfo = TremoloLfo::new(48_000.0);
    let lfo_allocations = allocations_during(|| {
        lfo.update_active(true, true);
        for (i, &waveform) in LfoWaveform::ALL.iter().enumerate() {
            lfo.set_waveform(waveform);
            let _ = lfo.set_rate(0.5 + i as f32 * 5.0);
            let _ = lfo.set_phase_offset(i as f64 * 20.0);
            let _ = lfo.set_waveshape(4.0, 0.4, ShaperWaveform::Sine, i % 2 == 0);
            for _ in 0..2_000 {
                lfo.next_sample();
            }
        }

        let _ = lfo.set_sync(true, 4.0);
        let _ = lfo.set_bpm(150.0);
        for _ in 0..2_000 {
            lfo.next_sample();
        }

        lfo.update_active(false, true);
        for _ in 0..20_000 {
            lfo.next_sample();
        }
        let _ = lfo.set_sample_rate(96_000.0);
        for _ in 0..1_000 {
            lfo.next_sample();
        }
    });
    assert_eq!(lfo_allocations, 0, "TremoloLfo allocated on the audio path");
}

#[cfg(feature = "rtrb")]
#[test]
fn engine_does_not_allocate() {
    // queued control changes are drained inside process_block
    let (mut handle, receiver) = saavy_tremolo::engine::control::channel(64);
    let mut engine = TremoloEngine::new(48_000.0)
        .with_params(&TremoloParams::default())
        .with_receiver(receiver);
    engine.prepare(48_000.0).unwrap();

    handle.set_rate(7.5).unwrap();
    handle.set_depth(0.9).unwrap();
    handle.set_waveform(LfoWaveform::Triangle).unwrap();
    handle.set_mix(0.7).unwrap();

    let mut left = vec![0.25f32; 512];
    let mut right = vec![-0.25f32; 512];

    let engine_allocations = allocations_during(|| {
        for block in 0..200 {
            let transport = if block < 150 {
                Transport::playing().with_bpm(128.0).with_beat_position(block as f64 * 0.02)
            } else {
                Transport::playing().with_bpm(128.0)
            };
            if block == 100 {
                left.iter_mut().for_each(|s| *s = 0.0);
                right.iter_mut().for_each(|s| *s = 0.0);
            }
            engine.process_block(&mut left, &mut right, transport);
        }
        engine.process_block(&mut left, &mut right, Transport::stopped());
    });
    assert_eq!(engine_allocations, 0, "TremoloEngine allocated on the audio path");
}
