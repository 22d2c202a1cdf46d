macro_rules! select_user_app {
    () => {
        r#"
SELECT
    u.id,u.username,u.password_hash,u.created_at,u.updated_at,
    GROUP_CONCAT(r.name) AS roles
FROM user_app AS u
LEFT JOIN user_role AS ur ON (ur.user_id = u.id)
LEFT JOIN role AS r ON (r.id = ur.role_id)
"#
    };
}

macro_rules! select_appointment {
    () => {
        r#"
SELECT
    a.id,a.scheduled_at,a.pet_id,a.client_id,a.veterinarian_id,
    s.name AS status,
    p.name AS pet_name,
    u.username AS client_username,
    v.full_name AS veterinarian_name
FROM appointment AS a
INNER JOIN appointment_status AS s ON (s.id = a.status_id)
INNER JOIN pet AS p ON (p.id = a.pet_id)
INNER JOIN user_app AS u ON (u.id = a.client_id)
INNER JOIN veterinarian AS v ON (v.id = a.veterinarian_id)
"#
    };
}

macro_rules! select_prescription {
    () => {
        r#"
SELECT
    pr.id,pr.appointment_id,pr.pet_id,pr.veterinarian_id,pr.product_id,
    pr.quantity,pr.instructions,pr.issued_on,pr.paid,
    prod.name AS product_name
FROM prescription AS pr
INNER JOIN product AS prod ON (prod.id = pr.product_id)
"#
    };
}

pub const QUERY_GET_USER_APP_BY_ID: &str =
    concat!(select_user_app!(), "WHERE u.id = $1 GROUP BY u.id;");

pub const QUERY_GET_USER_APP_BY_USERNAME: &str =
    concat!(select_user_app!(), "WHERE u.username = $1 GROUP BY u.id;");

pub const QUERY_GET_ALL_USER_APP: &str =
    concat!(select_user_app!(), "GROUP BY u.id ORDER BY u.username;");

pub const QUERY_INSERT_USER_APP: &str = r#"
INSERT INTO user_app(username,password_hash,created_at,updated_at) VALUES($1,$2,$3,$4);
"#;

pub const QUERY_LINK_USER_ROLE: &str = r#"
INSERT OR IGNORE INTO user_role(user_id,role_id) VALUES($1,$2);
"#;

pub const QUERY_GET_ROLE_ID: &str = "SELECT id FROM role WHERE name = $1;";

pub const QUERY_INSERT_VETERINARIAN: &str = r#"
INSERT INTO veterinarian(full_name,specialty,user_app_id) VALUES($1,$2,$3);
"#;

pub const QUERY_GET_VETERINARIAN_BY_ID: &str = r#"
SELECT id,full_name,specialty,user_app_id FROM veterinarian WHERE id = $1;
"#;

pub const QUERY_GET_VETERINARIAN_BY_USER_ID: &str = r#"
SELECT id,full_name,specialty,user_app_id FROM veterinarian WHERE user_app_id = $1;
"#;

pub const QUERY_GET_ALL_VETERINARIANS: &str = r#"
SELECT id,full_name,specialty,user_app_id FROM veterinarian ORDER BY full_name;
"#;

pub const QUERY_INSERT_PET: &str = r#"
INSERT INTO pet(owner_id,name,species,breed,birth_date,created_at) VALUES($1,$2,$3,$4,$5,$6);
"#;

pub const QUERY_GET_PET_BY_ID: &str = r#"
SELECT id,owner_id,name,species,breed,birth_date,created_at FROM pet WHERE id = $1;
"#;

pub const QUERY_GET_ALL_PETS_OWNER_ID: &str = r#"
SELECT id,owner_id,name,species,breed,birth_date,created_at
FROM pet
WHERE owner_id = $1
ORDER BY name;
"#;

pub const QUERY_GET_APPOINTMENT_STATUS_ID: &str =
    "SELECT id FROM appointment_status WHERE name = $1;";

pub const QUERY_GET_APPOINTMENT_BY_ID: &str = concat!(select_appointment!(), "WHERE a.id = $1;");

pub const QUERY_GET_APPOINTMENTS_BY_CLIENT: &str = concat!(
    select_appointment!(),
    "WHERE a.client_id = $1 ORDER BY a.scheduled_at;"
);

pub const QUERY_GET_APPOINTMENTS_BY_VETERINARIAN: &str = concat!(
    select_appointment!(),
    "WHERE a.veterinarian_id = $1 ORDER BY a.scheduled_at;"
);

pub const QUERY_GET_APPOINTMENTS_BY_PET: &str = concat!(
    select_appointment!(),
    "WHERE a.pet_id = $1 ORDER BY a.scheduled_at;"
);

pub const QUERY_EXISTS_APPOINTMENT_PET_AT: &str = r#"
SELECT EXISTS(SELECT 1 FROM appointment WHERE pet_id = $1 AND scheduled_at = $2);
"#;

pub const QUERY_EXISTS_APPOINTMENT_VETERINARIAN_AT: &str = r#"
SELECT EXISTS(SELECT 1 FROM appointment WHERE veterinarian_id = $1 AND scheduled_at = $2);
"#;

pub const QUERY_INSERT_APPOINTMENT: &str = r#"
INSERT INTO appointment(
    scheduled_at,pet_id,client_id,veterinarian_id,status_id,created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$6,$7);
"#;

pub const QUERY_UPDATE_APPOINTMENT_STATUS: &str = r#"
UPDATE appointment SET status_id = $2, updated_at = $3 WHERE id = $1;
"#;

pub const QUERY_INSERT_PRODUCT: &str = r#"
INSERT INTO product(name,description,price,stock,created_at,updated_at) VALUES($1,$2,$3,$4,$5,$6);
"#;

pub const QUERY_GET_PRODUCT_BY_ID: &str = r#"
SELECT id,name,description,price,stock,created_at,updated_at FROM product WHERE id = $1;
"#;

pub const QUERY_GET_ALL_PRODUCTS: &str = r#"
SELECT id,name,description,price,stock,created_at,updated_at FROM product ORDER BY name;
"#;

pub const QUERY_SET_PRODUCT_STOCK: &str = r#"
UPDATE product SET stock = $2, updated_at = $3 WHERE id = $1;
"#;

/// Stock never goes below zero: a bigger decrement leaves it at 0.
pub const QUERY_DECREMENT_PRODUCT_STOCK: &str = r#"
UPDATE product SET stock = MAX(stock - $2, 0), updated_at = $3 WHERE id = $1
RETURNING stock;
"#;

pub const QUERY_INSERT_PRESCRIPTION: &str = r#"
INSERT INTO prescription(
    appointment_id,pet_id,veterinarian_id,product_id,quantity,instructions,issued_on,paid
) VALUES($1,$2,$3,$4,$5,$6,$7,$8);
"#;

pub const QUERY_GET_PRESCRIPTION_BY_ID: &str =
    concat!(select_prescription!(), "WHERE pr.id = $1;");

pub const QUERY_GET_PRESCRIPTIONS_BY_PET: &str = concat!(
    select_prescription!(),
    "WHERE pr.pet_id = $1 ORDER BY pr.issued_on DESC, pr.id DESC;"
);

pub const QUERY_MARK_PRESCRIPTION_PAID: &str = r#"
UPDATE prescription SET paid = 1, paid_at = $2
WHERE id = $1 AND paid = 0
RETURNING product_id,quantity;
"#;
