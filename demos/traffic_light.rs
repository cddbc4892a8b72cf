//! Traffic Light Controller
//!
//! Two intersections' worth of lights, North-South and East-West, each
//! driven by its own machine on its own thread. The machines never talk to
//! each other: the Yellow -> Red effect hands the right of way to the other
//! road through a caller-owned mutex and condvar carried in the context.
//!
//! Key concepts:
//! - Registered transitions with effects
//! - Two machines sharing one internal state pool
//! - Synchronization supplied by the host, not the engine
//!
//! Run with: RUST_LOG=stator=debug cargo run --example traffic_light

use stator::alloc::SharedPool;
use stator::core::State;
use stator::machine::InternalMachine;
use stator::{state_set, transition, MachineError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Road {
    NorthSouth,
    EastWest,
}

impl Road {
    fn other(self) -> Self {
        match self {
            Self::NorthSouth => Self::EastWest,
            Self::EastWest => Self::NorthSouth,
        }
    }
}

type RightOfWay = Arc<(Mutex<Road>, Condvar)>;

struct Signal {
    road: Road,
    name: &'static str,
    traffic: &'static str,
    right_of_way: RightOfWay,
}

impl Signal {
    fn wait_for_turn(&self) {
        let (lock, cv) = &*self.right_of_way;
        let turn = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _turn = cv
            .wait_while(turn, |turn| *turn != self.road)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn hand_over(&self) {
        let (lock, cv) = &*self.right_of_way;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = self.road.other();
        cv.notify_all();
    }
}

#[derive(Default)]
struct Green;
#[derive(Default)]
struct Yellow;
#[derive(Default)]
struct Red;

impl State<Signal> for Green {
    fn on_enter(&self, signal: &mut Signal) {
        println!("{}: Green light ON. Cars can go.", signal.name);
    }

    fn on_exit(&self, signal: &mut Signal) {
        println!("{}: Green light OFF.", signal.name);
    }
}

impl State<Signal> for Yellow {
    fn on_enter(&self, signal: &mut Signal) {
        println!("{}: Yellow light ON. Cars should slow down.", signal.name);
    }

    fn on_exit(&self, signal: &mut Signal) {
        println!("{}: Yellow light OFF.", signal.name);
    }
}

impl State<Signal> for Red {
    fn on_enter(&self, signal: &mut Signal) {
        println!("{}: Red light ON. Cars must stop.", signal.name);
    }

    fn on_exit(&self, signal: &mut Signal) {
        println!("{}: Red light OFF.", signal.name);
    }
}

transition!(Red => Green for Signal, |signal| {
    println!("{} is passing.", signal.traffic);
});

transition!(Green => Yellow for Signal, |signal| {
    println!("{} is slowing down.", signal.traffic);
});

transition!(Yellow => Red for Signal, |signal| {
    println!("{} has stopped.", signal.traffic);
    signal.hand_over();
});

state_set! {
    struct Light: Signal {
        Green,
        Yellow,
        Red,
    }
}

fn run_road(
    mut machine: InternalMachine<Light>,
    mut signal: Signal,
    cycles: usize,
) -> Result<(), MachineError> {
    machine.start::<Red>(&mut signal)?;

    for _ in 0..cycles {
        signal.wait_for_turn();
        machine.transition::<Red, Green>(&mut signal)?;
        thread::sleep(Duration::from_millis(300));
        machine.transition::<Green, Yellow>(&mut signal)?;
        thread::sleep(Duration::from_millis(200));
        machine.transition::<Yellow, Red>(&mut signal)?;
    }

    machine.stop(&mut signal);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light Controller ===\n");

    let pool = SharedPool::<Light>::shared();
    let right_of_way: RightOfWay = Arc::new((Mutex::new(Road::NorthSouth), Condvar::new()));

    let roads = [
        (Road::NorthSouth, "N-S machine", "North-South traffic"),
        (Road::EastWest, "E-W machine", "East-West traffic"),
    ];

    let handles: Vec<_> = roads
        .into_iter()
        .map(|(road, name, traffic)| {
            let machine = InternalMachine::<Light>::internal(Arc::clone(&pool));
            let signal = Signal {
                road,
                name,
                traffic,
                right_of_way: Arc::clone(&right_of_way),
            };
            thread::spawn(move || run_road(machine, signal, 2))
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(error)) => eprintln!("Controller failed: {error}"),
            Err(_) => eprintln!("Controller thread panicked"),
        }
    }

    println!("\nPool constructions: {}", pool.constructions());
    println!("Pool still constructed: {}", pool.is_constructed());
    println!("\n=== Example Complete ===");
}
