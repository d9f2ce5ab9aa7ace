#[derive(Debug, Clone)]
struct LookSprites {
    horizontal: Sprite,
    up: Sprite,
    down: Sprite,
}

impl LookSprites {
    fn for_look(&self, look: LookIntent) -> &Sprite {
        match look {
            LookIntent::Horizontal => &self.horizontal,
            LookIntent::Up => &self.up,
            LookIntent::Down => &self.down,
        }
    }
}

/// Side-scrolling player: walking, jumping with variable height, and a
/// post-hit invincibility window that absorbs repeated damage events.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    position: Vec2,
    velocity: Vec2,
    horizontal: HorizontalIntent,
    look: LookIntent,
    facing: Facing,
    on_ground: bool,
    jump_active: bool,
    health: u32,
    invincible: Timer,
    sprites: FacingTable<LookSprites>,
}

impl Player {
    pub(crate) fn new(sprites: &mut SpriteLibrary, spawn_top_left: Vec2) -> Result<Self, SpriteError> {
        let table = FacingTable::try_build(|facing| {
            let row = match facing {
                Facing::Left => LEFT_FACING_ROW,
                Facing::Right => RIGHT_FACING_ROW,
            };
            Ok::<_, SpriteError>(LookSprites {
                horizontal: sprites.sprite(PLAYER_SPRITE_KEY, PixelRect::tile(STAND_FRAME_COLUMN, row))?,
                up: sprites.sprite(PLAYER_SPRITE_KEY, PixelRect::tile(LOOK_UP_FRAME_COLUMN, row))?,
                down: sprites.sprite(PLAYER_SPRITE_KEY, PixelRect::tile(LOOK_DOWN_FRAME_COLUMN, row))?,
            })
        })?;
        Ok(Self {
            position: spawn_top_left,
            velocity: Vec2::default(),
            horizontal: HorizontalIntent::Stop,
            look: LookIntent::Horizontal,
            facing: Facing::Left,
            on_ground: false,
            jump_active: false,
            health: PLAYER_MAX_HEALTH,
            invincible: Timer::new(INVINCIBLE_TIME),
            sprites: table,
        })
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn look(&self) -> LookIntent {
        self.look
    }

    pub(crate) fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn is_invincible(&self) -> bool {
        self.invincible.is_active()
    }

    fn collision_rectangle(&self) -> Rectangle {
        Rectangle::new(
            self.position.x + PLAYER_COLLISION_INSET_X,
            self.position.y,
            TILE_SIZE - 2.0 * PLAYER_COLLISION_INSET_X,
            TILE_SIZE,
        )
    }

    fn update_x(&mut self, elapsed_ms: f32, map: &TestMap) {
        let direction = match self.horizontal {
            HorizontalIntent::MoveLeft => -1.0,
            HorizontalIntent::MoveRight => 1.0,
            HorizontalIntent::Stop => 0.0,
        };
        let acceleration = if self.on_ground {
            WALKING_ACCELERATION
        } else {
            AIR_ACCELERATION
        };

        if direction != 0.0 {
            self.velocity.x = (self.velocity.x + direction * acceleration * elapsed_ms)
                .clamp(-MAX_SPEED_X, MAX_SPEED_X);
        } else if self.on_ground {
            let slowed = self.velocity.x.abs() - FRICTION * elapsed_ms;
            self.velocity.x = slowed.max(0.0) * self.velocity.x.signum();
        }

        self.position.x += self.velocity.x * elapsed_ms;
        if let Some(tile) = map.first_collision(&self.collision_rectangle()) {
            if self.velocity.x > 0.0 {
                self.position.x = tile.left() - TILE_SIZE + PLAYER_COLLISION_INSET_X;
            } else {
                self.position.x = tile.right() - PLAYER_COLLISION_INSET_X;
            }
            self.velocity.x = 0.0;
        }
    }

    fn update_y(&mut self, elapsed_ms: f32, map: &TestMap) {
        let gravity = if self.jump_active && self.velocity.y < 0.0 {
            JUMP_GRAVITY
        } else {
            GRAVITY
        };
        self.velocity.y = (self.velocity.y + gravity * elapsed_ms).min(MAX_SPEED_Y);

        self.position.y += self.velocity.y * elapsed_ms;
        self.on_ground = false;
        if let Some(tile) = map.first_collision(&self.collision_rectangle()) {
            if self.velocity.y > 0.0 {
                self.position.y = tile.top() - TILE_SIZE;
                self.on_ground = true;
            } else {
                self.position.y = tile.bottom();
            }
            self.velocity.y = 0.0;
        }
    }

    fn sprite_is_visible(&self) -> bool {
        if !self.invincible.is_active() {
            return true;
        }
        (self.invincible.current_time().as_millis() / INVINCIBLE_FLASH_PERIOD_MS) % 2 == 1
    }
}

impl DamageVolume for Player {
    fn damage_volume(&self) -> Rectangle {
        Rectangle::new(
            self.position.x + PLAYER_COLLISION_INSET_X,
            self.position.y + PLAYER_DAMAGE_INSET_Y,
            TILE_SIZE - 2.0 * PLAYER_COLLISION_INSET_X,
            TILE_SIZE - PLAYER_DAMAGE_INSET_Y,
        )
    }
}

impl PlayerEntity<TestMap> for Player {
    fn apply_intents(&mut self, intents: PlayerIntents) {
        self.horizontal = intents.horizontal;
        match intents.horizontal {
            HorizontalIntent::MoveLeft => self.facing = Facing::Left,
            HorizontalIntent::MoveRight => self.facing = Facing::Right,
            HorizontalIntent::Stop => {}
        }
        self.look = intents.look;
        match intents.jump {
            JumpIntent::Start => {
                self.jump_active = true;
                if self.on_ground {
                    self.velocity.y = -JUMP_SPEED;
                    self.on_ground = false;
                }
            }
            JumpIntent::Stop => self.jump_active = false,
            JumpIntent::None => {}
        }
    }

    fn update(&mut self, elapsed: Duration, map: &TestMap) {
        self.invincible.update(elapsed);
        let elapsed_ms = elapsed.as_secs_f32() * 1000.0;
        self.update_x(elapsed_ms, map);
        self.update_y(elapsed_ms, map);
    }

    fn draw(&self, graphics: &mut dyn GraphicsSink) {
        if !self.sprite_is_visible() {
            return;
        }
        let sprite = self.sprites.get(self.facing).for_look(self.look);
        graphics.draw_sprite(sprite, self.position);
    }

    fn draw_hud(&self, graphics: &mut dyn GraphicsSink) {
        for slot in 0..PLAYER_MAX_HEALTH {
            let color = if slot < self.health {
                HUD_FULL_COLOR
            } else {
                HUD_EMPTY_COLOR
            };
            let x = HUD_ORIGIN.x + slot as Game * (HUD_CELL_SIZE + HUD_CELL_GAP);
            graphics.fill_rect(
                Rectangle::new(x, HUD_ORIGIN.y, HUD_CELL_SIZE, HUD_CELL_SIZE),
                color,
            );
        }
    }

    fn center_x(&self) -> Game {
        self.position.x + HALF_TILE
    }

    fn take_damage(&mut self, event: &DamageEvent) {
        if self.invincible.is_active() {
            debug!(attacker = ?event.attacker, "damage_ignored_invincible");
            return;
        }
        self.health = self.health.saturating_sub(1);
        self.invincible.reset();
        self.velocity.y = self.velocity.y.min(-DAMAGE_HOP_SPEED);
        self.on_ground = false;
        info!(attacker = ?event.attacker, health = self.health, "player_damaged");
    }
}
