use nalgebra::point;
use rand::{rngs::StdRng, Rng, SeedableRng};
use spatial_quadtree::{Circle, Config, Error, Positioned, QuadTree, Rect, Shape, P2};

#[derive(Clone, Debug)]
struct Agent {
    id: usize,
    pos: P2,
    prev: P2,
}

impl Positioned for Agent {
    type Key = usize;

    fn key(&self) -> usize {
        self.id
    }

    fn position(&self) -> P2 {
        self.pos
    }

    fn previous_position(&self) -> P2 {
        self.prev
    }
}

const HALF: f64 = 500.0;

fn bounds() -> Rect {
    Rect::new(point![0.0, 0.0], 2.0 * HALF, 2.0 * HALF)
}

fn random_point(rng: &mut StdRng) -> P2 {
    point![rng.gen_range(-HALF..=HALF), rng.gen_range(-HALF..=HALF)]
}

fn random_shapes(rng: &mut StdRng) -> (Rect, Circle) {
    let rect = Rect::new(
        random_point(rng),
        rng.gen_range(1.0..400.0),
        rng.gen_range(1.0..400.0),
    );
    let circle = Circle::new(random_point(rng), rng.gen_range(1.0..300.0));
    (rect, circle)
}

fn query_ids<S: Shape>(qt: &QuadTree<Agent>, shape: &S) -> Vec<usize> {
    let mut results = Vec::new();
    qt.query(shape, &mut results);
    let mut ids: Vec<usize> = results.iter().map(|a| a.id).collect();
    ids.sort_unstable();
    ids
}

fn scan_ids<S: Shape>(agents: &[Option<Agent>], shape: &S) -> Vec<usize> {
    agents
        .iter()
        .flatten()
        .filter(|a| shape.contains(&a.pos))
        .map(|a| a.id)
        .collect()
}

fn assert_matches_scan(qt: &QuadTree<Agent>, agents: &[Option<Agent>], rng: &mut StdRng) {
    for _ in 0..20 {
        let (rect, circle) = random_shapes(rng);
        assert_eq!(
            query_ids(qt, &rect),
            scan_ids(agents, &rect),
            "Rect query should match a full scan for {rect:?}"
        );
        assert_eq!(
            query_ids(qt, &circle),
            scan_ids(agents, &circle),
            "Circle query should match a full scan for {circle:?}"
        );
    }
}

#[test]
fn cardinality_after_inserts() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut qt = QuadTree::new(bounds(), Config::new(2, 8)).unwrap();
    for id in 0..1000 {
        let pos = random_point(&mut rng);
        qt.insert(&Agent { id, pos, prev: pos }).unwrap();
    }

    assert_eq!(qt.len(), 1000, "Tree should count every inserted agent");
    assert_eq!(
        query_ids(&qt, &bounds()).len(),
        1000,
        "A query covering the root should return every agent"
    );
}

#[test]
fn queries_match_scan_through_churn() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut qt = QuadTree::new(bounds(), Config::new(3, 6)).unwrap();
    let mut agents: Vec<Option<Agent>> = Vec::new();

    for id in 0..500 {
        let pos = random_point(&mut rng);
        let agent = Agent { id, pos, prev: pos };
        qt.insert(&agent).unwrap();
        agents.push(Some(agent));
    }
    assert_matches_scan(&qt, &agents, &mut rng);

    for round in 0..10 {
        for slot in agents.iter_mut() {
            let Some(agent) = slot.as_mut() else { continue };
            match rng.gen_range(0..10) {
                0 => {
                    assert!(qt.remove(agent).is_some(), "Stored agent should be removable");
                    *slot = None;
                }
                1..=5 => {
                    // small step, usually inside the same cell
                    let step = point![rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)];
                    let target = agent.pos + step.coords;
                    let target = point![target.x.clamp(-HALF, HALF), target.y.clamp(-HALF, HALF)];
                    agent.prev = agent.pos;
                    agent.pos = target;
                    qt.update(agent).unwrap();
                }
                _ => {
                    agent.prev = agent.pos;
                    agent.pos = random_point(&mut rng);
                    qt.update(agent).unwrap();
                }
            }
        }

        let live = agents.iter().flatten().count();
        assert_eq!(qt.len(), live, "Tree count should track live agents in round {round}");
        assert_matches_scan(&qt, &agents, &mut rng);
    }
}

#[test]
fn removed_agents_never_return() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut qt = QuadTree::new(bounds(), Config::new(1, 4)).unwrap();
    let agents: Vec<Agent> = (0..200)
        .map(|id| {
            let pos = random_point(&mut rng);
            Agent { id, pos, prev: pos }
        })
        .collect();
    for agent in &agents {
        qt.insert(agent).unwrap();
    }

    for agent in agents.iter().filter(|a| a.id % 2 == 0) {
        qt.remove(agent).unwrap();
    }

    let remaining = query_ids(&qt, &bounds());
    assert_eq!(remaining.len(), 100, "Half of the agents should remain");
    assert!(
        remaining.iter().all(|id| id % 2 == 1),
        "No removed agent should be returned"
    );

    for agent in agents.iter().filter(|a| a.id % 2 == 1) {
        qt.remove(agent).unwrap();
    }
    assert!(qt.is_empty(), "Tree should be empty after removing everything");
    assert!(qt.is_leaf(), "An emptied tree should collapse back to a leaf");
}

#[test]
fn out_of_bounds_is_reported() {
    let mut qt = QuadTree::new(bounds(), Config::new(1, 4)).unwrap();
    let pos = point![HALF + 1.0, 0.0];
    assert_eq!(
        qt.insert(&Agent { id: 0, pos, prev: pos }),
        Err(Error::OutOfBounds { x: HALF + 1.0, y: 0.0 }),
        "Insert outside the root should be rejected"
    );

    let inside = point![10.0, 10.0];
    let mut agent = Agent { id: 1, pos: inside, prev: inside };
    qt.insert(&agent).unwrap();
    agent.prev = agent.pos;
    agent.pos = point![0.0, -HALF - 0.5];
    assert!(
        matches!(qt.update(&agent), Err(Error::OutOfBounds { .. })),
        "Moving outside the root should be reported"
    );
    assert!(qt.is_empty(), "Agent that left the bounds should be evicted");
}
