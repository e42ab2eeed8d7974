use haunted_run::arena::Arena;
use haunted_run::config::*;
use haunted_run::entities::*;
use haunted_run::levels::*;

use tempfile::tempdir;

fn roster(n: usize) -> Level {
    let mut level = level_by_id(1);
    level.enemies = (0..n)
        .map(|i| Enemy::new(EnemyKind::Ghost, 500.0 + i as f32 * 300.0, 510.0, 100.0, 1.0))
        .collect();
    level
}

// ── catalogue ─────────────────────────────────────────────────────────────────

#[test]
fn catalogue_ids_are_sequential() {
    let ids: Vec<u32> = catalogue().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(level_count(), 3);
}

#[test]
fn lookup_by_id() {
    assert_eq!(level_by_id(2).name, "Spooky Forest");
    assert_eq!(level_by_id(3).name, "Witch's Castle");
}

#[test]
fn unknown_id_falls_back_to_first_level() {
    assert_eq!(level_by_id(0).id, 1);
    assert_eq!(level_by_id(42).name, "Haunted Graveyard");
}

#[test]
fn levels_are_playable() {
    for level in catalogue() {
        assert!(!level.platforms.is_empty(), "{}", level.name);
        assert!(!level.enemies.is_empty(), "{}", level.name);
        assert!(level.finish_x > 0.0, "{}", level.name);
        assert_eq!(level.ground_y(), DEFAULT_GROUND_Y, "{}", level.name);
        assert!(level.enemies.iter().all(|e| !e.dead && e.start_x == e.body.x));
        assert!(level.collectibles.iter().all(|c| c.value == c.kind.value()));
    }
}

// ── scale_enemies ─────────────────────────────────────────────────────────────

#[test]
fn factor_one_keeps_roster() {
    let mut level = roster(4);
    let before = level.enemies.clone();
    scale_enemies(&mut level, 1.0);
    assert_eq!(level.enemies, before);
}

#[test]
fn easy_thins_roster() {
    let mut level = roster(10);
    scale_enemies(&mut level, Difficulty::Easy.settings().enemy_count_factor);
    assert_eq!(level.enemies.len(), 7);
    assert_eq!(level.enemies.first().unwrap().start_x, 500.0);
}

#[test]
fn thinning_keeps_at_least_one() {
    let mut level = roster(1);
    scale_enemies(&mut level, 0.1);
    assert_eq!(level.enemies.len(), 1);
}

#[test]
fn hard_adds_mirrored_twins() {
    let mut level = roster(10);
    scale_enemies(&mut level, Difficulty::Hard.settings().enemy_count_factor);
    assert_eq!(level.enemies.len(), 13);

    let original = level.enemies.iter().next().unwrap().clone();
    let twin = level.enemies.iter().nth(10).unwrap();
    assert_eq!(twin.kind, original.kind);
    assert_eq!(twin.start_x, original.start_x);
    assert_eq!(twin.body.x, original.start_x + original.patrol_distance / 2.0);
    assert_eq!(twin.direction, -original.direction);
}

#[test]
fn empty_roster_stays_empty() {
    let mut level = roster(0);
    scale_enemies(&mut level, 1.3);
    assert!(level.enemies.is_empty());
}

// ── level files ───────────────────────────────────────────────────────────────

#[test]
fn hand_written_level_file_loads() {
    let json = r##"{
        "id": 7,
        "name": "Pumpkin Patch",
        "platforms": [
            {"x": 0, "y": 550, "width": 1200, "height": 50, "type": "ground"},
            {"x": 300, "y": 430, "width": 100, "height": 20, "type": "breakable"}
        ],
        "enemies": [
            {"x": 600, "y": 525, "width": 30, "height": 25, "type": "bat",
             "startX": 600, "patrolDistance": 80, "speed": 1.5}
        ],
        "collectibles": [
            {"x": 320, "y": 390, "width": 30, "height": 30, "type": "pumpkin", "value": 50}
        ],
        "powerUps": [
            {"x": 700, "y": 480, "width": 30, "height": 30, "type": "doubleJump"}
        ],
        "backgroundColor": "#1a0033",
        "gravity": 0.45,
        "finishX": 1100
    }"##;
    let dir = tempdir().unwrap();
    let path = dir.path().join("patch.json");
    std::fs::write(&path, json).unwrap();

    let level = load_level_file(&path).unwrap();
    assert_eq!(level.id, 7);
    assert_eq!(level.platforms.len(), 2);
    assert_eq!(level.platforms.iter().nth(1).unwrap().kind, PlatformKind::Breakable);

    let bat = level.enemies.first().unwrap();
    assert_eq!(bat.kind, EnemyKind::Bat);
    assert_eq!(bat.direction, 1.0);
    assert!(!bat.dead);

    assert_eq!(level.power_ups.first().unwrap().kind, PowerUpKind::DoubleJump);
    assert_eq!(level.background_color, Rgb::new(0x1a, 0x00, 0x33));
    assert_eq!(level.gravity, Some(0.45));
    assert_eq!(level.time_limit, None);
    assert_eq!(level.finish_x, 1100.0);
}

#[test]
fn saved_level_reloads_identically() {
    let level = level_by_id(3);
    let dir = tempdir().unwrap();
    let path = dir.path().join("castle.json");
    std::fs::write(&path, serde_json::to_string(&level).unwrap()).unwrap();
    assert_eq!(load_level_file(&path).unwrap(), level);
}

#[test]
fn bad_level_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"id": 1, "name": "no platforms"}"#).unwrap();
    assert!(load_level_file(&path).is_err());
    assert!(load_level_file(&dir.path().join("missing.json")).is_err());
}

#[test]
fn bad_colour_is_rejected() {
    assert_eq!(Rgb::from_hex("#ff8c00"), Some(Rgb::new(0xff, 0x8c, 0x00)));
    assert_eq!(Rgb::from_hex("#ff8c"), None);
    assert_eq!(Rgb::from_hex("#zz8c00"), None);
    assert_eq!(Rgb::new(0xff, 0x8c, 0x00).to_string(), "#ff8c00");
}

// ── difficulty ────────────────────────────────────────────────────────────────

#[test]
fn difficulty_table() {
    let easy = Difficulty::Easy.settings();
    let normal = Difficulty::Normal.settings();
    let hard = Difficulty::Hard.settings();
    assert_eq!((easy.player_lives, normal.player_lives, hard.player_lives), (5, 3, 1));
    assert!(easy.score_multiplier < normal.score_multiplier);
    assert!(normal.score_multiplier < hard.score_multiplier);
    assert!(easy.enemy_speed_factor < normal.enemy_speed_factor);
    assert!(normal.enemy_speed_factor < hard.enemy_speed_factor);
}

#[test]
fn awards_round_half_up() {
    let normal = Difficulty::Normal.settings();
    assert_eq!(normal.award(10), 15);
    assert_eq!(normal.award(25), 38);
    assert_eq!(normal.award(1000), 1500);
    assert_eq!(Difficulty::Hard.settings().award(50), 100);
}

#[test]
fn difficulty_cycles() {
    assert_eq!(Difficulty::Easy.next(), Difficulty::Normal);
    assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    assert_eq!(Difficulty::default(), Difficulty::Normal);
}

// ── settings ──────────────────────────────────────────────────────────────────

#[test]
fn config_uses_camel_case_keys() {
    let config: GameConfig = serde_json::from_str(
        r#"{"difficulty": "hard", "soundEnabled": false, "musicEnabled": true, "playerName": "Jack"}"#,
    )
    .unwrap();
    assert_eq!(config.difficulty, Difficulty::Hard);
    assert!(!config.sound_enabled);
    assert_eq!(config.player_name, "Jack");
}

#[test]
fn partial_config_fills_defaults() {
    let config: GameConfig = serde_json::from_str(r#"{"difficulty": "easy"}"#).unwrap();
    assert_eq!(config.difficulty, Difficulty::Easy);
    assert!(config.sound_enabled);
    assert!(config.music_enabled);
}

#[test]
fn settings_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings {
        game: GameConfig { difficulty: Difficulty::Hard, player_name: "Wednesday".into(), ..GameConfig::default() },
        level_id: 2,
    };
    settings.save(&path).unwrap();
    assert_eq!(Settings::load_or_default(&path), settings);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"levelId\": 2"));
    assert!(text.contains("\"playerName\""));
}

#[test]
fn missing_or_malformed_settings_use_defaults() {
    let dir = tempdir().unwrap();
    assert_eq!(Settings::load_or_default(&dir.path().join("none.json")), Settings::default());

    let path = dir.path().join("bad.json");
    std::fs::write(&path, "[1, 2").unwrap();
    assert_eq!(Settings::load_or_default(&path), Settings::default());
    assert_eq!(Settings::default().level_id, 1);
}

#[test]
fn arena_from_vec_keeps_order() {
    let arena: Arena<u32> = vec![3, 1, 2].into();
    assert_eq!(arena.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
}
