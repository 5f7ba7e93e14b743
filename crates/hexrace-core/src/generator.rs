//! Seeded procedural world generation.
//!
//! `generate(seed, level)` always yields the same `HexWorld` for the same
//! inputs. The pipeline runs in a fixed order:
//!
//! 1. Frontier growth from the origin up to the level's target size
//! 2. Gap filling of single-tile holes
//! 3. Radius derivation
//! 4. Terrain classification by distance band and moisture
//! 5. Isolated ruin placement
//! 6. Start and exit placement
//! 7. Forest clusters
//! 8. Lake clusters
//! 9. Key placement
//!
//! No phase ever fails: when a phase runs out of candidates it stops early and
//! records a [`GenerationAnomaly`] in the [`GenerationReport`].

use crate::hex::HexCoord;
use crate::terrain::TerrainKind;
use crate::world::{HexWorld, Tile};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Tiles in a level-0 world
pub const BASE_SIZE: usize = 350;

/// Extra tiles per level
pub const GROWTH: usize = 50;

/// Up to this size every frontier candidate is admitted
const BOOTSTRAP_SIZE: usize = 20;

/// Share of frontier candidates admitted once past the bootstrap
const ADMIT_RATIO: f64 = 0.85;

const GAP_FILL_PASSES: usize = 3;

/// A hole is filled when at least this many of its neighbors are placed
const GAP_FILL_MIN_NEIGHBORS: usize = 4;

/// Tiles this close to the origin are always calm ground
const CORE_RADIUS: u32 = 3;

/// Inner band, as a fraction of the radius
const INNER_FRACTION: f64 = 0.4;

/// Rim band starts beyond this fraction of the radius
const RIM_FRACTION: f64 = 0.55;

const INNER_MOUNTAIN_CHANCE: f64 = 0.06;

const RUIN_BAND: RangeInclusive<u32> = 4..=9;
const RUIN_CHANCE: f64 = 0.015;

/// Ruins closer than or equal to this distance to an accepted ruin are rejected
const RUIN_ISOLATION: u32 = 4;

/// The exit prefers hard terrain beyond this fraction of the radius
const EXIT_MIN_FRACTION: f64 = 0.6;

const FOREST_CLUSTERS: RangeInclusive<usize> = 4..=7;
const FOREST_SIZE: RangeInclusive<usize> = 6..=12;
const FOREST_ATTEMPTS: usize = 30;

/// Forest seeds keep at least this far from the origin
const FOREST_MIN_DISTANCE: u32 = 2;

const LAKE_CLUSTERS: RangeInclusive<usize> = 3..=5;
const LAKE_SIZE: RangeInclusive<usize> = 4..=9;
const LAKE_ATTEMPTS: usize = 20;

/// The first key lies farther than this fraction of the radius from the exit
const KEY_EXIT_FRACTION: f64 = 0.55;

/// The second key lies farther than this fraction of the radius from the first
const KEY_SPREAD_FRACTION: f64 = 0.4;

/// Number of tiles a world of the given level grows to
pub fn target_size(level: u32) -> usize {
    BASE_SIZE + level as usize * GROWTH
}

/// Something a generation phase could not fully deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationAnomaly {
    /// Growth ran out of frontier before reaching the target size
    FrontierExhausted { placed: usize, target: usize },
    /// No hard-terrain tile was far enough out; the farthest tile became the exit
    ExitFallback,
    /// Fewer forest clusters than rolled
    FewerForests { requested: usize, placed: usize },
    /// Fewer lake clusters than rolled
    FewerLakes { requested: usize, placed: usize },
    /// Fewer than two keys could be placed
    MissingKey { placed: usize },
}

/// Outcome notes of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub target_size: usize,
    pub anomalies: Vec<GenerationAnomaly>,
}

impl GenerationReport {
    /// True when every phase delivered everything it rolled
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// True when the world is smaller than its target size
    pub fn is_undersized(&self) -> bool {
        self.anomalies
            .iter()
            .any(|a| matches!(a, GenerationAnomaly::FrontierExhausted { .. }))
    }

    fn flag(&mut self, anomaly: GenerationAnomaly) {
        tracing::warn!(target: "hexrace::worldgen", ?anomaly, "worldgen.anomaly");
        self.anomalies.push(anomaly);
    }
}

/// Generate the world for a seed and level
pub fn generate(seed: u64, level: u32) -> HexWorld {
    generate_with_report(seed, level).0
}

/// Generate the world and report any phase that fell short
pub fn generate_with_report(seed: u64, level: u32) -> (HexWorld, GenerationReport) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    WorldGenerator::new(seed, level).run(&mut rng)
}

/// Runs the generation phases against one random source
pub struct WorldGenerator {
    seed: u64,
    level: u32,
    report: GenerationReport,
}

impl WorldGenerator {
    pub fn new(seed: u64, level: u32) -> Self {
        Self {
            seed,
            level,
            report: GenerationReport {
                target_size: target_size(level),
                anomalies: Vec::new(),
            },
        }
    }

    /// Run every phase in order with the provided RNG
    pub fn run<R: Rng>(mut self, rng: &mut R) -> (HexWorld, GenerationReport) {
        let target = self.report.target_size;
        let mut placed = self.grow_landmass(target, rng);
        fill_gaps(&mut placed);

        let mut world = HexWorld::new(self.seed, self.level);
        for coord in &placed {
            world.insert(Tile::new(*coord, TerrainKind::Plains));
        }
        world.recompute_radius();

        self.classify_terrain(&mut world, rng);
        self.place_ruins(&mut world, rng);
        self.place_start_and_exit(&mut world, rng);
        self.place_forests(&mut world, rng);
        self.place_lakes(&mut world, rng);
        self.place_keys(&mut world, rng);

        tracing::debug!(
            target: "hexrace::worldgen",
            seed = self.seed,
            level = self.level,
            tiles = world.len(),
            radius = world.radius,
            ruins = world.count_kind(TerrainKind::Ruins),
            keys = world.count_kind(TerrainKind::Key),
            "worldgen.complete"
        );

        (world, self.report)
    }

    /// Phase 1: grow a connected landmass outward from the origin
    fn grow_landmass<R: Rng>(&mut self, target: usize, rng: &mut R) -> BTreeSet<HexCoord> {
        let mut placed = BTreeSet::from([HexCoord::ORIGIN]);
        let mut frontier = vec![HexCoord::ORIGIN];

        while placed.len() < target {
            let candidates: BTreeSet<HexCoord> = frontier
                .iter()
                .flat_map(|c| c.neighbors())
                .filter(|n| !placed.contains(n))
                .collect();

            if candidates.is_empty() {
                self.report.flag(GenerationAnomaly::FrontierExhausted {
                    placed: placed.len(),
                    target,
                });
                break;
            }

            let mut candidates: Vec<HexCoord> = candidates.into_iter().collect();
            candidates.shuffle(rng);

            let admit = if placed.len() <= BOOTSTRAP_SIZE {
                candidates.len()
            } else {
                ((candidates.len() as f64 * ADMIT_RATIO) as usize).max(1)
            };

            let mut admitted = Vec::with_capacity(admit);
            for coord in candidates.into_iter().take(admit) {
                if placed.len() >= target {
                    break;
                }
                placed.insert(coord);
                admitted.push(coord);
            }

            // Only the newest layer grows; skipped candidates become gaps
            frontier = admitted;
        }

        placed
    }

    /// Phase 4: assign terrain from distance band and moisture
    fn classify_terrain<R: Rng>(&mut self, world: &mut HexWorld, rng: &mut R) {
        let radius = world.radius;
        for tile in world.tiles_mut() {
            let kind = classify(tile.coord, radius, rng);
            tile.set_kind(kind);
            tile.variant = (((moisture(tile.coord) + 2.0) / 4.0).clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    /// Phase 5: scatter isolated ruins in the middle band
    fn place_ruins<R: Rng>(&mut self, world: &mut HexWorld, rng: &mut R) {
        let mut eligible: Vec<HexCoord> = world
            .tiles()
            .filter(|t| {
                RUIN_BAND.contains(&t.coord.distance_to(&HexCoord::ORIGIN))
                    && !matches!(t.kind, TerrainKind::Mountain | TerrainKind::Lake)
            })
            .map(|t| t.coord)
            .collect();
        eligible.shuffle(rng);

        let mut accepted: Vec<HexCoord> = Vec::new();
        for coord in eligible {
            if !rng.gen_bool(RUIN_CHANCE) {
                continue;
            }
            if accepted
                .iter()
                .any(|ruin| ruin.distance_to(&coord) <= RUIN_ISOLATION)
            {
                continue;
            }
            world.set_kind(&coord, TerrainKind::Ruins);
            accepted.push(coord);
        }
    }

    /// Phase 6: force the start onto the origin and choose the exit
    fn place_start_and_exit<R: Rng>(&mut self, world: &mut HexWorld, rng: &mut R) {
        world.set_kind(&HexCoord::ORIGIN, TerrainKind::Start);
        world.start = HexCoord::ORIGIN;

        let threshold = world.radius as f64 * EXIT_MIN_FRACTION;
        let candidates: Vec<HexCoord> = world
            .tiles()
            .filter(|t| {
                t.kind.is_hard() && t.coord.distance_to(&HexCoord::ORIGIN) as f64 > threshold
            })
            .map(|t| t.coord)
            .collect();

        let exit = match candidates.choose(rng) {
            Some(coord) => *coord,
            None => {
                self.report.flag(GenerationAnomaly::ExitFallback);
                farthest_tile(world)
            }
        };

        world.set_kind(&exit, TerrainKind::Exit);
        world.exit = exit;
        world.set_exit_locked(true);
    }

    /// Phase 7: grow forest blobs over open ground
    fn place_forests<R: Rng>(&mut self, world: &mut HexWorld, rng: &mut R) {
        let requested = rng.gen_range(FOREST_CLUSTERS);
        let placed = grow_clusters(
            world,
            requested,
            ClusterShape {
                size: FOREST_SIZE,
                attempts: FOREST_ATTEMPTS,
                kind: TerrainKind::Forest,
            },
            |tile| {
                tile.coord.distance_to(&HexCoord::ORIGIN) > FOREST_MIN_DISTANCE
                    && !matches!(
                        tile.kind,
                        TerrainKind::Start
                            | TerrainKind::Exit
                            | TerrainKind::Mountain
                            | TerrainKind::Volcanic
                            | TerrainKind::Tundra
                            | TerrainKind::Wasteland
                            | TerrainKind::Ruins
                            | TerrainKind::Forest
                    )
            },
            |tile| tile.kind.is_open(),
            rng,
        );
        if placed < requested {
            self.report
                .flag(GenerationAnomaly::FewerForests { requested, placed });
        }
    }

    /// Phase 8: grow lake blobs away from the start, exit and ruins
    fn place_lakes<R: Rng>(&mut self, world: &mut HexWorld, rng: &mut R) {
        let requested = rng.gen_range(LAKE_CLUSTERS);
        let rim = world.radius.saturating_sub(1);
        let floodable = |tile: &Tile| {
            !matches!(
                tile.kind,
                TerrainKind::Start | TerrainKind::Exit | TerrainKind::Ruins | TerrainKind::Lake
            ) && tile.coord.distance_to(&HexCoord::ORIGIN) > 1
        };
        let placed = grow_clusters(
            world,
            requested,
            ClusterShape {
                size: LAKE_SIZE,
                attempts: LAKE_ATTEMPTS,
                kind: TerrainKind::Lake,
            },
            |tile| floodable(tile) && tile.coord.distance_to(&HexCoord::ORIGIN) < rim,
            &floodable,
            rng,
        );
        if placed < requested {
            self.report
                .flag(GenerationAnomaly::FewerLakes { requested, placed });
        }
    }

    /// Phase 9: place up to two keys far from the exit and from each other.
    ///
    /// When no tile is far enough from the exit, every valid tile qualifies.
    fn place_keys<R: Rng>(&mut self, world: &mut HexWorld, rng: &mut R) {
        let radius = world.radius as f64;
        let exit = world.exit;

        let valid = key_candidates(world);
        let far_from_exit: Vec<HexCoord> = valid
            .iter()
            .copied()
            .filter(|c| c.distance_to(&exit) as f64 > radius * KEY_EXIT_FRACTION)
            .collect();
        let pool = if far_from_exit.is_empty() {
            valid
        } else {
            far_from_exit
        };
        let Some(&first) = pool.choose(rng) else {
            self.report.flag(GenerationAnomaly::MissingKey { placed: 0 });
            return;
        };
        world.set_kind(&first, TerrainKind::Key);

        let remaining: Vec<HexCoord> = pool.into_iter().filter(|c| *c != first).collect();
        let spread: Vec<HexCoord> = remaining
            .iter()
            .copied()
            .filter(|c| c.distance_to(&first) as f64 > radius * KEY_SPREAD_FRACTION)
            .collect();
        let second = spread.choose(rng).or_else(|| remaining.choose(rng)).copied();
        match second {
            Some(coord) => world.set_kind(&coord, TerrainKind::Key),
            None => self.report.flag(GenerationAnomaly::MissingKey { placed: 1 }),
        }
    }
}

/// Phase 2: fill holes that are mostly surrounded by placed tiles
fn fill_gaps(placed: &mut BTreeSet<HexCoord>) {
    for _ in 0..GAP_FILL_PASSES {
        let gaps: BTreeSet<HexCoord> = placed
            .iter()
            .flat_map(|c| c.neighbors())
            .filter(|n| !placed.contains(n))
            .filter(|n| {
                n.neighbors().iter().filter(|m| placed.contains(m)).count()
                    >= GAP_FILL_MIN_NEIGHBORS
            })
            .collect();
        if gaps.is_empty() {
            break;
        }
        placed.extend(gaps);
    }
}

/// Terrain for a coordinate given the world radius
fn classify<R: Rng>(coord: HexCoord, radius: u32, rng: &mut R) -> TerrainKind {
    use TerrainKind::*;

    let distance = coord.distance_to(&HexCoord::ORIGIN);
    let radius = radius as f64;

    if distance <= CORE_RADIUS {
        return pick(rng, &[Plains, Plains, Hills]);
    }

    if distance as f64 <= radius * INNER_FRACTION {
        if rng.gen_bool(INNER_MOUNTAIN_CHANCE) {
            return Mountain;
        }
        return pick(rng, &[Hills, Plains, Forest]);
    }

    let wet = moisture(coord);
    if distance as f64 > radius * RIM_FRACTION {
        return if wet > 0.0 {
            pick(rng, &[Tundra, Tundra, Wasteland])
        } else {
            pick(rng, &[Volcanic, Wasteland, Mountain])
        };
    }

    match wet {
        w if w > 0.8 => Lake,
        w if w > 0.2 => pick(rng, &[Swamp, Swamp, Swamp, Plains]),
        w if w < -0.5 => pick(rng, &[Dunes, Scrub, Dunes]),
        _ => pick(rng, &[Plains, Hills, Scrub, Mountain]),
    }
}

/// Uniform choice from a non-empty table
fn pick<R: Rng>(rng: &mut R, kinds: &[TerrainKind]) -> TerrainKind {
    kinds[rng.gen_range(0..kinds.len())]
}

/// Smooth field in `-2..=2` derived from the coordinate
fn moisture(coord: HexCoord) -> f64 {
    (coord.q as f64 * 0.25).sin() + (coord.r as f64 * 0.25).cos()
}

fn farthest_tile(world: &HexWorld) -> HexCoord {
    world
        .coords()
        .fold(HexCoord::ORIGIN, |best, coord| {
            if coord.distance_to(&HexCoord::ORIGIN) > best.distance_to(&HexCoord::ORIGIN) {
                coord
            } else {
                best
            }
        })
}

/// Tiles a key may be placed on
fn key_candidates(world: &HexWorld) -> Vec<HexCoord> {
    world
        .tiles()
        .filter(|t| {
            t.is_passable()
                && !matches!(
                    t.kind,
                    TerrainKind::Start
                        | TerrainKind::Exit
                        | TerrainKind::Key
                        | TerrainKind::Ruins
                        | TerrainKind::Mountain
                )
        })
        .map(|t| t.coord)
        .collect()
}

/// Size and terrain of one family of blobs
struct ClusterShape {
    size: RangeInclusive<usize>,
    attempts: usize,
    kind: TerrainKind,
}

/// Random-walk blobs converting tiles to `shape.kind`. Seeds are drawn from
/// tiles passing `seed_ok`, growth only spreads onto tiles passing `grow_ok`.
/// Returns how many clusters were placed.
fn grow_clusters<R, S, G>(
    world: &mut HexWorld,
    count: usize,
    shape: ClusterShape,
    seed_ok: S,
    grow_ok: G,
    rng: &mut R,
) -> usize
where
    R: Rng,
    S: Fn(&Tile) -> bool,
    G: Fn(&Tile) -> bool,
{
    let mut placed = 0;
    for _ in 0..count {
        let seeds: Vec<HexCoord> = world
            .tiles()
            .filter(|t| seed_ok(t))
            .map(|t| t.coord)
            .collect();
        let Some(&seed) = seeds.choose(rng) else {
            break;
        };

        let cap = rng.gen_range(shape.size.clone());
        let mut cluster = vec![seed];
        for _ in 0..shape.attempts {
            if cluster.len() >= cap {
                break;
            }
            let from = cluster[rng.gen_range(0..cluster.len())];
            let next = from.neighbors()[rng.gen_range(0..6)];
            if cluster.contains(&next) {
                continue;
            }
            if world.get_tile(&next).is_some_and(|t| grow_ok(t)) {
                cluster.push(next);
            }
        }

        for coord in &cluster {
            world.set_kind(coord, shape.kind);
        }
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Smallest hexagon radius whose area holds `n` tiles
    fn min_hexagon_radius(n: usize) -> u32 {
        let mut r = 0u32;
        while 3 * (r as usize) * (r as usize + 1) + 1 < n {
            r += 1;
        }
        r
    }

    fn reachable_from_origin(world: &HexWorld) -> usize {
        let mut seen = BTreeSet::from([HexCoord::ORIGIN]);
        let mut queue = VecDeque::from([HexCoord::ORIGIN]);
        while let Some(coord) = queue.pop_front() {
            for n in world.neighbors_of(&coord) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen.len()
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = generate(1234, 2);
        let b = generate(1234, 2);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a.to_record()).unwrap(),
            serde_json::to_string(&b.to_record()).unwrap()
        );
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(1, 1);
        let b = generate(2, 1);
        assert_ne!(a.to_record().tiles, b.to_record().tiles);
    }

    #[test]
    fn test_world_invariants_across_seeds() {
        for seed in 0..25u64 {
            for level in 1..=3 {
                let (world, report) = generate_with_report(seed, level);
                assert_eq!(world.count_kind(TerrainKind::Start), 1, "seed {seed}");
                assert_eq!(world.count_kind(TerrainKind::Exit), 1, "seed {seed}");
                assert!(world.count_kind(TerrainKind::Key) <= 2, "seed {seed}");
                assert!(
                    world.len() >= target_size(level) || report.is_undersized(),
                    "seed {seed} level {level}: {} tiles",
                    world.len()
                );
                assert_eq!(world.kind_at(&HexCoord::ORIGIN), Some(TerrainKind::Start));
                assert_eq!(world.kind_at(&world.exit), Some(TerrainKind::Exit));
                assert!(world.get_tile(&world.exit).unwrap().locked);
            }
        }
    }

    #[test]
    fn test_every_tile_connected_to_origin() {
        for seed in [3u64, 99, 4242] {
            let world = generate(seed, 2);
            assert_eq!(reachable_from_origin(&world), world.len());
        }
    }

    #[test]
    fn test_radius_is_one_past_farthest_tile() {
        let world = generate(77, 1);
        let farthest = world
            .coords()
            .map(|c| c.distance_to(&HexCoord::ORIGIN))
            .max()
            .unwrap();
        assert_eq!(world.radius, farthest + 1);
    }

    #[test]
    fn test_ruins_are_isolated_and_banded() {
        for seed in 0..40u64 {
            let world = generate(seed, 3);
            let ruins: Vec<_> = world
                .tiles()
                .filter(|t| t.kind == TerrainKind::Ruins)
                .map(|t| t.coord)
                .collect();
            for (i, a) in ruins.iter().enumerate() {
                assert!(RUIN_BAND.contains(&a.distance_to(&HexCoord::ORIGIN)));
                for b in &ruins[i + 1..] {
                    assert!(a.distance_to(b) > RUIN_ISOLATION, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn test_lakes_keep_away_from_start() {
        for seed in 0..25u64 {
            let world = generate(seed, 1);
            for n in HexCoord::ORIGIN.neighbors() {
                assert_ne!(world.kind_at(&n), Some(TerrainKind::Lake), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_seed_42_level_1() {
        let (world, report) = generate_with_report(42, 1);
        assert!(world.radius > min_hexagon_radius(target_size(1)));
        assert_eq!(world.count_kind(TerrainKind::Start), 1);
        assert_eq!(world.count_kind(TerrainKind::Exit), 1);
        assert_eq!(world.get_tile(&HexCoord::ORIGIN).unwrap().cost, 0);
        assert_eq!(report.target_size, 400);
    }

    #[test]
    fn test_gap_fill_closes_enclosed_hole() {
        let mut placed: BTreeSet<HexCoord> = HexCoord::ORIGIN.neighbors().into_iter().collect();
        fill_gaps(&mut placed);
        assert!(placed.contains(&HexCoord::ORIGIN));
    }

    #[test]
    fn test_inner_band_is_calm() {
        for seed in 0..10u64 {
            let world = generate(seed, 1);
            for n in HexCoord::ORIGIN.neighbors() {
                let kind = world.kind_at(&n).unwrap();
                assert!(
                    matches!(
                        kind,
                        TerrainKind::Plains
                            | TerrainKind::Hills
                            | TerrainKind::Forest
                            | TerrainKind::Key
                    ),
                    "seed {seed}: {kind:?}"
                );
            }
        }
    }

    #[test]
    fn test_classify_bands() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for coord in HexCoord::ORIGIN.neighbors() {
            let kind = classify(coord, 12, &mut rng);
            assert!(matches!(kind, TerrainKind::Plains | TerrainKind::Hills), "{kind:?}");
        }

        // Radius 20 puts distance 6 in the inner band
        for _ in 0..50 {
            let kind = classify(HexCoord::new(6, 0), 20, &mut rng);
            assert!(
                matches!(
                    kind,
                    TerrainKind::Hills
                        | TerrainKind::Plains
                        | TerrainKind::Forest
                        | TerrainKind::Mountain
                ),
                "{kind:?}"
            );
        }

        // Distance 15 of 20 is on the rim; moisture at (0, 15) is below zero
        assert!(moisture(HexCoord::new(0, 15)) < 0.0);
        for _ in 0..50 {
            let kind = classify(HexCoord::new(0, 15), 20, &mut rng);
            assert!(
                matches!(
                    kind,
                    TerrainKind::Volcanic | TerrainKind::Wasteland | TerrainKind::Mountain
                ),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn test_generated_worlds_have_no_walls() {
        for seed in 0..10u64 {
            assert_eq!(generate(seed, 1).count_kind(TerrainKind::Wall), 0);
        }
    }

    #[test]
    fn test_keys_fall_back_to_any_valid_tile() {
        let mut world = HexWorld::from_tiles(
            0,
            1,
            vec![
                Tile::new(HexCoord::ORIGIN, TerrainKind::Start),
                Tile::new(HexCoord::new(1, 0), TerrainKind::Exit),
                Tile::new(HexCoord::new(0, 1), TerrainKind::Plains),
                Tile::new(HexCoord::new(1, -1), TerrainKind::Plains),
            ],
        );
        // A wide radius puts both plains well inside the exit's exclusion zone
        world.radius = 10;
        let mut generator = WorldGenerator::new(0, 1);
        generator.place_keys(&mut world, &mut ChaCha8Rng::seed_from_u64(1));

        assert_eq!(world.count_kind(TerrainKind::Key), 2);
        assert!(generator.report.is_clean());
    }
}
