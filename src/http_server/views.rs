//! HTML pages
//!
//! Small server-rendered pages. Every interpolated value goes through
//! [`escape`].

use crate::participants::Participant;

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | Skate Park</title>\n<link rel=\"stylesheet\" href=\"/css/style.css\">\n</head>\n<body>\n<h1>Skate Park</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn photo_url(photo: &str) -> String {
    format!("/uploads/{}", escape(photo))
}

/// Home page: participants visible to everyone
pub fn home(participants: &[Participant]) -> String {
    let rows: String = participants
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "<tr><td>{}</td><td><img src=\"{}\" alt=\"foto\" width=\"64\"></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                i + 1,
                photo_url(&p.photo),
                escape(&p.name),
                p.years_experience,
                escape(&p.specialty),
                p.state.as_str()
            )
        })
        .collect();

    layout(
        "Participantes",
        &format!(
            "<table>\n<tr><th>#</th><th>Foto</th><th>Nombre</th><th>Años de experiencia</th><th>Especialidad</th><th>Estado</th></tr>\n{}</table>\n<p><a href=\"/login\">Iniciar sesión</a> | <a href=\"/registrar\">Registrarme</a></p>",
            rows
        ),
    )
}

pub fn login_form() -> String {
    layout(
        "Iniciar sesión",
        "<form method=\"post\" action=\"/login\">\n<label>Email <input type=\"email\" name=\"email\" required></label>\n<label>Password <input type=\"password\" name=\"password\" required></label>\n<button type=\"submit\">Ingresar</button>\n</form>\n<p><a href=\"/registrar\">Registrarme</a></p>",
    )
}

pub fn register_form() -> String {
    layout(
        "Registro",
        "<form method=\"post\" action=\"/register\" enctype=\"multipart/form-data\">\n<label>Email <input type=\"email\" name=\"email\" required></label>\n<label>Nombre <input type=\"text\" name=\"nombre\" required></label>\n<label>Password <input type=\"password\" name=\"password\" required></label>\n<label>Repita la password <input type=\"password\" name=\"repeatPassword\" required></label>\n<label>Años de experiencia <input type=\"number\" min=\"0\" name=\"anos_experiencia\" required></label>\n<label>Especialidad <input type=\"text\" name=\"especialidad\" required></label>\n<label>Foto de perfil <input type=\"file\" name=\"foto\" accept=\"image/*\" required></label>\n<button type=\"submit\">Registrarme</button>\n</form>\n<p><a href=\"/login\">Iniciar sesión</a></p>",
    )
}

pub fn success() -> String {
    layout(
        "Registro exitoso",
        "<p>Registro exitoso. Tu perfil está en revisión.</p>\n<p><a href=\"/perfil\">Ver mi perfil</a> | <a href=\"/\">Inicio</a></p>",
    )
}

/// Administrator view with approve and delete actions
pub fn admin(participants: &[Participant]) -> String {
    let rows: String = participants
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{id}</td><td><img src=\"{photo}\" alt=\"foto\" width=\"64\"></td><td>{name}</td><td>{email}</td><td>{years}</td><td>{specialty}</td><td>{state}</td><td><form method=\"post\" action=\"/approve/{id}\"><button type=\"submit\">Aprobar</button></form> <a href=\"/delete/{id}\">Eliminar</a></td></tr>\n",
                id = p.id,
                photo = photo_url(&p.photo),
                name = escape(&p.name),
                email = escape(&p.email),
                years = p.years_experience,
                specialty = escape(&p.specialty),
                state = p.state.as_str()
            )
        })
        .collect();

    layout(
        "Administración",
        &format!(
            "<table>\n<tr><th>Id</th><th>Foto</th><th>Nombre</th><th>Email</th><th>Años de experiencia</th><th>Especialidad</th><th>Estado</th><th></th></tr>\n{}</table>\n<p><a href=\"/logout\">Cerrar sesión</a></p>",
            rows
        ),
    )
}

pub fn delete_confirm(id: i32) -> String {
    layout(
        "Eliminar participante",
        &format!(
            "<p>¿Eliminar al participante {id}?</p>\n<form method=\"post\" action=\"/delete/{id}\"><button type=\"submit\">Eliminar</button></form>\n<p><a href=\"/admin\">Cancelar</a></p>",
            id = id
        ),
    )
}

/// Own profile, read-only
pub fn profile(participant: &Participant) -> String {
    layout(
        "Mi perfil",
        &format!(
            "<img src=\"{}\" alt=\"foto\" width=\"128\">\n<dl>\n<dt>Nombre</dt><dd>{}</dd>\n<dt>Email</dt><dd>{}</dd>\n<dt>Especialidad</dt><dd>{}</dd>\n<dt>Años de experiencia</dt><dd>{}</dd>\n</dl>\n<p><a href=\"/edit\">Editar</a> | <a href=\"/logout\">Cerrar sesión</a></p>",
            photo_url(&participant.photo),
            escape(&participant.name),
            escape(&participant.email),
            escape(&participant.specialty),
            participant.years_experience
        ),
    )
}

/// Own profile as an edit form
pub fn edit_form(participant: &Participant) -> String {
    layout(
        "Editar perfil",
        &format!(
            "<form method=\"post\" action=\"/edit\" enctype=\"multipart/form-data\">\n<label>Email <input type=\"email\" value=\"{}\" disabled></label>\n<label>Nombre <input type=\"text\" name=\"nombre\" value=\"{}\" required></label>\n<label>Años de experiencia <input type=\"number\" min=\"0\" name=\"anos_experiencia\" value=\"{}\" required></label>\n<label>Especialidad <input type=\"text\" name=\"especialidad\" value=\"{}\" required></label>\n<label>Foto de perfil <input type=\"file\" name=\"foto\" accept=\"image/*\"></label>\n<button type=\"submit\">Actualizar</button>\n</form>\n<p><a href=\"/perfil\">Volver</a></p>",
            escape(&participant.email),
            escape(&participant.name),
            participant.years_experience,
            escape(&participant.specialty)
        ),
    )
}
